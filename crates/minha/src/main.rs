use std::sync::Arc;

use minha_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), minha_core::Error> {
    minha_core::logging::init("minha")?;

    // Refuse to start without a token: nothing is spawned and no request is made.
    let cfg = Arc::new(Config::load()?);

    minha_telegram::router::run(cfg)
        .await
        .map_err(|e| minha_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
