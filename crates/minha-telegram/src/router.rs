use std::{sync::Arc, time::Duration};

use teloxide::prelude::*;

use minha_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use minha_core::{
    config::Config, dispatcher::UpdateDispatcher, health, messaging::port::MessagingPort,
    monitor::ChangeMonitor, retry::RetryPolicy, subscribers::SubscriberStore,
};

use crate::fetcher::HttpPageFetcher;
use crate::{TelegramMessenger, TelegramUpdateSource};

/// Extra HTTP time on top of the long-poll timeout so the request is not cut
/// off while Telegram is still holding it open.
const LONG_POLL_GRACE: Duration = Duration::from_secs(5);

/// Wire everything up and run until the process is killed.
///
/// The health endpoint and the page monitor run as background tasks; the
/// update dispatcher occupies the calling task.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(cfg.poll_timeout + LONG_POLL_GRACE)
        .build()?;
    let bot = Bot::with_client(cfg.telegram_token.clone(), client);

    match bot.get_me().await {
        Ok(me) => tracing::info!("minha bot started: @{}", me.username()),
        Err(e) => tracing::warn!("getMe failed (continuing): {e}"),
    }

    let subscribers = Arc::new(SubscriberStore::load(&cfg.subscribers_file).await?);
    tracing::info!(
        "Loaded {} subscribers from {}",
        subscribers.len().await,
        cfg.subscribers_file.display()
    );

    // Broadcasts fan out to every subscriber; throttle to stay under Telegram flood limits.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let port = cfg.port;
    tokio::spawn(async move {
        if let Err(e) = health::run(port).await {
            tracing::error!("[web] server failed: {e}");
        }
    });

    let monitor = ChangeMonitor::new(
        cfg.minha_url.clone(),
        cfg.check_interval,
        Arc::new(HttpPageFetcher::new(cfg.fetch_timeout)?),
        messenger.clone(),
        subscribers.clone(),
    );
    tokio::spawn(monitor.run());

    let dispatcher = UpdateDispatcher::new(
        Arc::new(TelegramUpdateSource::new(bot)),
        messenger,
        subscribers,
        cfg.poll_timeout,
        RetryPolicy::fixed(cfg.retry_delay),
    );
    dispatcher.run().await;

    Ok(())
}
