use tracing::{Level, debug};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vector_api::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Seed the environment from .env when present; a missing file is fine.
    let dotenv = dotenvy::dotenv();

    let filter = telemetry::env_filter_with_level("error", Level::WARN);

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(error = %err, "no .env loaded"),
    }

    notes_console::start().await?;

    Ok(())
}
