//! Telegram adapter (teloxide) and HTTP page fetcher.
//!
//! This crate implements the `minha-core` ports over the Telegram Bot API and
//! plain HTTP.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{Update, UpdateKind},
};

use tokio::time::sleep;

pub mod fetcher;
pub mod router;

use minha_core::{
    domain::{ChatId, UpdateId},
    errors::Error,
    messaging::{
        port::{MessagingPort, UpdateSource},
        types::{InboundMessage, InboundUpdate},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(map_err(other)),
                },
            }
        }
    }
}

fn map_err(e: teloxide::RequestError) -> Error {
    Error::Transport(format!("telegram error: {e}"))
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.with_retry(|| self.bot.send_message(Self::tg_chat(chat_id), text.to_string()))
            .await?;
        Ok(())
    }
}

/// `getUpdates` long polling.
#[derive(Clone)]
pub struct TelegramUpdateSource {
    bot: Bot,
}

impl TelegramUpdateSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateSource for TelegramUpdateSource {
    async fn poll(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<InboundUpdate>> {
        let mut req = self
            .bot
            .get_updates()
            .timeout(u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX));
        if let Some(offset) = offset {
            let offset = i32::try_from(offset)
                .map_err(|_| Error::Transport(format!("update offset out of range: {offset}")))?;
            req = req.offset(offset);
        }

        let updates = req.await.map_err(map_err)?;
        Ok(updates.into_iter().map(to_inbound).collect())
    }
}

/// Only `message` updates are handled; a message without text is treated as
/// empty text and gets the generic reply.
fn to_inbound(update: Update) -> InboundUpdate {
    let message = match &update.kind {
        UpdateKind::Message(msg) => Some(InboundMessage {
            chat_id: ChatId(msg.chat.id.0),
            text: msg.text().unwrap_or_default().to_string(),
        }),
        _ => None,
    };

    InboundUpdate {
        update_id: UpdateId(i64::from(update.id)),
        message,
    }
}
