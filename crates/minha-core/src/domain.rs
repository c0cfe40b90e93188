use serde::{Deserialize, Serialize};

/// Telegram chat id (numeric). Doubles as the subscriber identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Telegram update id. The next poll offset is always `last + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct UpdateId(pub i64);

impl UpdateId {
    pub fn next(self) -> i64 {
        self.0 + 1
    }
}
