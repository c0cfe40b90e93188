use crate::domain::{ChatId, UpdateId};

/// A text message received from a chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub text: String,
}

/// One item of an inbound update batch.
///
/// `message` is `None` for updates that are not plain text messages or lack the
/// fields we need; those are skipped but still consume their id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: UpdateId,
    pub message: Option<InboundMessage>,
}
