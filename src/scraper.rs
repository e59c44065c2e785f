use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use wizink_offers::{run, Config, HttpFetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = Config::default();
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout)?);
    let report = run(&config, fetcher, Utc::now()).await?;

    info!(
        added = report.added,
        total = report.total,
        "Generated {} and {}",
        config.html_path.display(),
        config.rss_path.display()
    );
    Ok(())
}
