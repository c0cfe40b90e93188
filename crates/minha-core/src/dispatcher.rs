//! Long-polling update dispatcher.
//!
//! Each poll asks for updates past the cursor, then handles them one by one in
//! arrival order. The cursor moves past every update before it is handled, so a
//! failing handler is logged and never replayed.

use std::{sync::Arc, time::Duration};

use crate::{
    language::{detect_language, Language},
    messaging::{
        port::{MessagingPort, UpdateSource},
        types::InboundMessage,
    },
    replies::{generate_reply, HELP, SUBSCRIBED, UNSUBSCRIBED, WELCOME},
    retry::RetryPolicy,
    subscribers::SubscriberStore,
    Result,
};

/// Commands the bot understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Subscribe,
    Unsubscribe,
    Help,
}

impl Command {
    /// Parse a `/command` message. Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        match command_name(text)?.as_str() {
            "start" => Some(Command::Start),
            "minha" => Some(Command::Subscribe),
            "stop" | "unsubscribe" => Some(Command::Unsubscribe),
            "help" | "aide" => Some(Command::Help),
            _ => None,
        }
    }
}

// Telegram may send `/cmd@botname arg1 ...`; only `cmd` matters.
fn command_name(text: &str) -> Option<String> {
    let rest = text.strip_prefix('/')?;
    let first = rest.split_whitespace().next().unwrap_or("");
    let name = first.split('@').next().unwrap_or("").to_lowercase();
    Some(name)
}

pub struct UpdateDispatcher {
    source: Arc<dyn UpdateSource>,
    messenger: Arc<dyn MessagingPort>,
    subscribers: Arc<SubscriberStore>,
    poll_timeout: Duration,
    retry: RetryPolicy,
    cursor: Option<i64>,
}

impl UpdateDispatcher {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        messenger: Arc<dyn MessagingPort>,
        subscribers: Arc<SubscriberStore>,
        poll_timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            messenger,
            subscribers,
            poll_timeout,
            retry,
            cursor: None,
        }
    }

    /// Offset the next poll will request (`None` until something was consumed).
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Poll once and dispatch the batch. Returns the number of updates consumed.
    ///
    /// A transport error leaves the cursor untouched so the same position is retried.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let batch = self.source.poll(self.cursor, self.poll_timeout).await?;
        let consumed = batch.len();

        for update in batch {
            let next = update.update_id.next();
            self.cursor = Some(self.cursor.map_or(next, |c| c.max(next)));

            let Some(msg) = update.message else {
                tracing::debug!("[updates] skipping update {}", update.update_id.0);
                continue;
            };
            if let Err(e) = self.handle_message(&msg).await {
                tracing::error!(
                    "[updates] failed to handle message from {}: {e}",
                    msg.chat_id.0
                );
            }
        }

        Ok(consumed)
    }

    /// Route one message to its command handler or the reply generator and send
    /// exactly one reply.
    pub async fn handle_message(&self, msg: &InboundMessage) -> Result<()> {
        let lang = detect_language(&msg.text);
        let reply = self.reply_for(msg, lang).await?;
        self.messenger.send_text(msg.chat_id, reply).await
    }

    async fn reply_for(&self, msg: &InboundMessage, lang: Language) -> Result<&'static str> {
        let reply = match Command::parse(&msg.text) {
            Some(Command::Start) => WELCOME.get(lang),
            Some(Command::Subscribe) => {
                if self.subscribers.add(msg.chat_id).await? {
                    tracing::info!("[updates] subscribed {}", msg.chat_id.0);
                }
                SUBSCRIBED.get(lang)
            }
            Some(Command::Unsubscribe) => {
                if self.subscribers.remove(msg.chat_id).await? {
                    tracing::info!("[updates] unsubscribed {}", msg.chat_id.0);
                }
                UNSUBSCRIBED.get(lang)
            }
            Some(Command::Help) => HELP.get(lang),
            None => generate_reply(&msg.text, lang),
        };
        Ok(reply)
    }

    /// Poll forever. Failed polls pause per the retry policy, then retry the
    /// same cursor.
    pub async fn run(mut self) {
        tracing::info!("[updates] starting long-polling");
        loop {
            if let Err(e) = self.poll_once().await {
                tracing::warn!("[updates] error: {e}");
                self.retry.pause().await;
            }
        }
    }
}
