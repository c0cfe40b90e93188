//! Page change monitor.
//!
//! State machine:
//! - no snapshot yet: the first successful fetch stores it silently
//! - tracking: any textual difference replaces the snapshot and alerts every subscriber
//!
//! Fetch failures leave the state untouched. The loop never stops.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    domain::ChatId,
    language::Language,
    messaging::port::MessagingPort,
    ports::PageFetcher,
    replies::alert_text,
    subscribers::SubscriberStore,
};

/// Language used for change alerts. No per-subscriber language is stored.
pub const ALERT_LANGUAGE: Language = Language::Arabic;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// First successful fetch; snapshot stored, nobody alerted.
    Initialized,
    Unchanged,
    Changed(BroadcastReport),
    FetchFailed,
}

pub struct ChangeMonitor {
    url: String,
    interval: Duration,
    fetcher: Arc<dyn PageFetcher>,
    messenger: Arc<dyn MessagingPort>,
    subscribers: Arc<SubscriberStore>,
    snapshot: Option<String>,
}

impl ChangeMonitor {
    pub fn new(
        url: impl Into<String>,
        interval: Duration,
        fetcher: Arc<dyn PageFetcher>,
        messenger: Arc<dyn MessagingPort>,
        subscribers: Arc<SubscriberStore>,
    ) -> Self {
        Self {
            url: url.into(),
            interval,
            fetcher,
            messenger,
            subscribers,
            snapshot: None,
        }
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Fetch once and compare against the stored snapshot.
    pub async fn tick(&mut self) -> TickOutcome {
        let content = match self.fetcher.fetch(&self.url).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("[monitor] error: {e}");
                return TickOutcome::FetchFailed;
            }
        };

        if self.snapshot.is_none() {
            self.snapshot = Some(content);
            return TickOutcome::Initialized;
        }
        if self.snapshot.as_deref() == Some(content.as_str()) {
            return TickOutcome::Unchanged;
        }

        tracing::info!("[monitor] change detected, notifying subscribers...");
        self.snapshot = Some(content);
        let recipients = self.subscribers.all().await;
        let report = broadcast(
            self.messenger.as_ref(),
            &recipients,
            &alert_text(&self.url, ALERT_LANGUAGE),
        )
        .await;
        tracing::info!(
            "[monitor] alert delivered to {} subscribers ({} failed)",
            report.delivered,
            report.failed
        );
        TickOutcome::Changed(report)
    }

    /// Tick forever at the configured interval, whatever the outcome.
    pub async fn run(mut self) {
        tracing::info!(
            "[monitor] starting. Monitoring {} every {}s",
            self.url,
            self.interval.as_secs()
        );
        loop {
            let outcome = self.tick().await;
            tracing::debug!("[monitor] tick: {outcome:?}");
            sleep(self.interval).await;
        }
    }
}

/// Send `text` to every recipient. One failed delivery never stops the rest.
pub async fn broadcast(
    messenger: &dyn MessagingPort,
    recipients: &[ChatId],
    text: &str,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for &chat_id in recipients {
        match messenger.send_text(chat_id, text).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!("[notify] failed to send to {}: {e}", chat_id.0);
                report.failed += 1;
            }
        }
    }
    report
}
