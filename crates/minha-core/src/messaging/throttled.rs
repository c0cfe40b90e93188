use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{domain::ChatId, messaging::port::MessagingPort, Result};

/// How often idle per-chat slots are dropped.
const SWEEP_EVERY: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Gap enforced between two sends, whatever the chat.
    pub global_min_interval: Duration,
    /// Gap enforced between two sends to one chat.
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        // Telegram allows roughly 30 msg/sec overall and 1 msg/sec per chat.
        Self {
            global_min_interval: Duration::from_millis(40),
            per_chat_min_interval: Duration::from_millis(1050),
        }
    }
}

/// Hands out send slots spaced `gap` apart.
#[derive(Debug)]
struct SlotClock {
    gap: Duration,
    free_at: Instant,
}

impl SlotClock {
    fn new(gap: Duration, now: Instant) -> Self {
        Self { gap, free_at: now }
    }

    /// Take the earliest free slot; returns how long to wait for it.
    fn take(&mut self, now: Instant) -> Duration {
        let slot = self.free_at.max(now);
        self.free_at = slot + self.gap;
        slot - now
    }

    fn idle(&self, now: Instant) -> bool {
        self.free_at <= now
    }
}

struct ChatClocks {
    clocks: HashMap<ChatId, Arc<Mutex<SlotClock>>>,
    last_sweep: Instant,
}

impl ChatClocks {
    /// Drop clocks whose slot is already free. A dropped clock is recreated
    /// as free on the next send, so nothing changes for that chat.
    fn sweep(&mut self, now: Instant) {
        if now.duration_since(self.last_sweep) < SWEEP_EVERY {
            return;
        }
        self.last_sweep = now;
        self.clocks
            .retain(|_, c| c.try_lock().map_or(true, |g| !g.idle(now)));
    }
}

/// Spaces outbound sends so a broadcast to every subscriber does not hit
/// Telegram's 429 flood control.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<SlotClock>,
    per_chat: Mutex<ChatClocks>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        let now = Instant::now();
        Self {
            inner,
            cfg,
            global: Mutex::new(SlotClock::new(cfg.global_min_interval, now)),
            per_chat: Mutex::new(ChatClocks {
                clocks: HashMap::new(),
                last_sweep: now,
            }),
        }
    }

    /// Number of chats with a live per-chat clock.
    pub async fn tracked_chats(&self) -> usize {
        self.per_chat.lock().await.clocks.len()
    }

    async fn clock_for(&self, chat_id: ChatId, now: Instant) -> Arc<Mutex<SlotClock>> {
        let mut chats = self.per_chat.lock().await;
        chats.sweep(now);
        let gap = self.cfg.per_chat_min_interval;
        chats
            .clocks
            .entry(chat_id)
            .or_insert_with(|| Arc::new(Mutex::new(SlotClock::new(gap, now))))
            .clone()
    }

    async fn wait_turn(&self, chat_id: ChatId) {
        let now = Instant::now();
        let global_wait = self.global.lock().await.take(now);
        let clock = self.clock_for(chat_id, now).await;
        let chat_wait = clock.lock().await.take(now);

        let wait = global_wait.max(chat_wait);
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.wait_turn(chat_id).await;
        self.inner.send_text(chat_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingMessenger {
        sent: std::sync::Mutex<Vec<(ChatId, Instant)>>,
    }

    #[async_trait]
    impl MessagingPort for RecordingMessenger {
        async fn send_text(&self, chat_id: ChatId, _text: &str) -> Result<()> {
            self.sent.lock().unwrap().push((chat_id, Instant::now()));
            Ok(())
        }
    }

    fn fast_config() -> ThrottleConfig {
        ThrottleConfig {
            global_min_interval: Duration::from_millis(1),
            per_chat_min_interval: Duration::from_millis(500),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_sends_to_the_same_chat() {
        let inner = Arc::new(RecordingMessenger::default());
        let throttled = ThrottledMessenger::new(
            inner.clone(),
            ThrottleConfig {
                global_min_interval: Duration::from_millis(10),
                per_chat_min_interval: Duration::from_millis(500),
            },
        );

        throttled.send_text(ChatId(1), "a").await.unwrap();
        throttled.send_text(ChatId(1), "b").await.unwrap();
        throttled.send_text(ChatId(2), "c").await.unwrap();

        let sent = inner.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent[1].1 - sent[0].1 >= Duration::from_millis(500));
        // A different chat only waits for the global slot.
        assert!(sent[2].1 - sent[1].1 < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_chat_clocks_are_dropped() {
        let throttled =
            ThrottledMessenger::new(Arc::new(RecordingMessenger::default()), fast_config());

        for id in 0..500 {
            throttled.send_text(ChatId(id), "alert").await.unwrap();
        }
        assert_eq!(throttled.tracked_chats().await, 500);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        throttled.send_text(ChatId(9999), "hi").await.unwrap();

        assert_eq!(throttled.tracked_chats().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_chat_clock_survives_a_sweep() {
        let inner = Arc::new(RecordingMessenger::default());
        let throttled = ThrottledMessenger::new(
            inner.clone(),
            ThrottleConfig {
                global_min_interval: Duration::from_millis(1),
                per_chat_min_interval: Duration::from_secs(120),
            },
        );

        throttled.send_text(ChatId(1), "a").await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        // Triggers a sweep; chat 1 still has its next slot in the future.
        throttled.send_text(ChatId(2), "b").await.unwrap();
        assert_eq!(throttled.tracked_chats().await, 2);

        throttled.send_text(ChatId(1), "c").await.unwrap();
        let sent = inner.sent.lock().unwrap();
        assert!(sent[2].1 - sent[0].1 >= Duration::from_secs(120));
    }
}
