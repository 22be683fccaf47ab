//! Daily Brief — Binary Entrypoint
//! Resolves configuration from the environment, runs the pipeline once, and
//! exits non-zero on any structural failure with a single diagnostic.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use power_daily_brief::config::RunConfig;
use power_daily_brief::engine;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("power_daily_brief=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let result = async {
        let config = RunConfig::from_env()?;
        engine::run(&config).await
    }
    .await;

    match result {
        Ok(report) => {
            tracing::info!(
                stories = report.stories,
                words = report.words,
                voice_path = ?report.voice_path,
                outcome = ?report.outcome,
                episode = %report.episode_path.display(),
                "run complete"
            );
        }
        Err(e) => {
            tracing::error!("run failed: {e:#}");
            std::process::exit(1);
        }
    }
}
