use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    fetch::{FetchError, Fetcher},
    page::{ExtractError, Extraction, PageExtractor},
    render::{render_html, render_rss},
    store::Store,
};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// What happened during one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Pages whose body was retrieved.
    pub fetched: usize,
    pub offers: usize,
    pub no_offer: usize,
    /// Pages skipped because of a fetch or extraction failure.
    pub failed: usize,
    /// Offers that were not in the store yet.
    pub added: usize,
    /// Store size after the merge.
    pub total: usize,
}

/// Fetch one page and pull its offer out.
#[tracing::instrument(skip(fetcher, extractor))]
pub async fn scrape_page(
    fetcher: &dyn Fetcher,
    extractor: &PageExtractor,
    url: &str,
) -> Result<Extraction, ScrapeError> {
    let page = fetcher.fetch(url).await?;
    Ok(extractor.extract(&page, url)?)
}

/// Fetches every configured page concurrently, merges what was found into the
/// store, then rewrites the store and both rendered documents.
///
/// Per-page failures are logged and skipped. Failing to load or save the store,
/// or to write an output, aborts the run.
pub async fn run(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    now: DateTime<Utc>,
) -> anyhow::Result<RunReport> {
    let mut store = Store::load(&config.db_path)
        .await
        .context("loading offer store")?;
    let extractor = Arc::new(PageExtractor::new(config).context("building page extractor")?);

    let mut set = JoinSet::new();
    for (ix, url) in config.urls.iter().cloned().enumerate() {
        let fetcher = fetcher.clone();
        let extractor = extractor.clone();
        set.spawn(async move {
            let outcome = scrape_page(fetcher.as_ref(), &extractor, &url).await;
            (ix, outcome)
        });
    }

    // Tasks finish in any order, slot them back into url order.
    let mut outcomes: Vec<Option<Result<Extraction, ScrapeError>>> =
        config.urls.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((ix, outcome)) => outcomes[ix] = Some(outcome),
            Err(e) => error!("scrape task died: {e}"),
        }
    }

    let mut report = RunReport::default();
    let mut incoming = vec![];
    for (url, outcome) in config.urls.iter().zip(outcomes) {
        match outcome {
            Some(Ok(Extraction::Offer(record))) => {
                report.fetched += 1;
                report.offers += 1;
                info!(%url, offer = %record.offer, start = %record.start, end = %record.end, "found offer");
                incoming.push(Some(record));
            }
            Some(Ok(Extraction::NoOffer)) => {
                report.fetched += 1;
                report.no_offer += 1;
                info!(%url, "no campaign at the moment");
            }
            Some(Err(ScrapeError::Fetch(e))) => {
                report.failed += 1;
                warn!(%url, error = ?e, "fetch failed, skipping page");
            }
            Some(Err(ScrapeError::Extract(e))) => {
                report.fetched += 1;
                report.failed += 1;
                warn!(%url, error = %e, "could not extract offer, skipping page");
            }
            None => report.failed += 1,
        }
    }

    report.added = store.merge(incoming);
    store.sort_by_start_desc();
    store
        .save(&config.db_path)
        .await
        .context("saving offer store")?;
    report.total = store.len();

    let html = render_html(store.records(), &config.feed, now);
    let rss = render_rss(store.records(), &config.feed, now).context("rendering rss feed")?;
    tokio::fs::write(&config.html_path, html)
        .await
        .with_context(|| format!("writing {}", config.html_path.display()))?;
    tokio::fs::write(&config.rss_path, rss)
        .await
        .with_context(|| format!("writing {}", config.rss_path.display()))?;

    info!(
        fetched = report.fetched,
        offers = report.offers,
        no_offer = report.no_offer,
        failed = report.failed,
        added = report.added,
        total = report.total,
        "run finished"
    );
    Ok(report)
}
