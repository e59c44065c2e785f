use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use wizink_offers::{run, Config, FetchError, Fetcher, Store};

/// Serves canned pages; unknown urls answer 404.
struct CannedFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn offer_page(name: &str, interval: &str) -> String {
    format!(
        r#"<html><body>
        <p class="offer__name">{name}</p>
        <div class="conditions__text"><ul><li>{interval}</li><li>Sujeito a aprovação.</li></ul></div>
        </body></html>"#
    )
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 9, 30, 0).unwrap()
}

fn setup(store_json: &str) -> (TempDir, Config, Arc<CannedFetcher>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("db.json"), store_json).unwrap();
    let config = Config::in_dir(dir.path()).with_urls([
        "https://offers.test/flash",
        "https://offers.test/extra",
        "https://offers.test/empty",
        "https://offers.test/broken",
        "https://offers.test/down",
    ]);
    let pages = HashMap::from([
        (
            "https://offers.test/flash".to_string(),
            offer_page("Até 60€ de\n oferta", "Adesões de 1 a 15 de março de 2024."),
        ),
        (
            "https://offers.test/extra".to_string(),
            offer_page("Oferta Extra", "Válida até 31 de março de 2024."),
        ),
        (
            "https://offers.test/empty".to_string(),
            "<html><body>Não temos nenhuma campanha especial, de momento.</body></html>"
                .to_string(),
        ),
        (
            "https://offers.test/broken".to_string(),
            offer_page("Oferta", "Campanha por tempo limitado"),
        ),
    ]);
    (dir, config, Arc::new(CannedFetcher { pages }))
}

#[tokio::test]
async fn run_merges_good_pages_and_skips_bad_ones() {
    let existing = r#"[
  {
    "start": "2024-02-01",
    "end": "2024-02-29",
    "url": "https://offers.test/flash",
    "offer": "Oferta de fevereiro"
  }
]"#;
    let (dir, config, fetcher) = setup(existing);

    let report = run(&config, fetcher, now()).await.unwrap();
    assert_eq!(report.fetched, 4);
    assert_eq!(report.offers, 2);
    assert_eq!(report.no_offer, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.added, 2);
    assert_eq!(report.total, 3);

    let store = Store::load(&config.db_path).await.unwrap();
    let starts: Vec<String> = store.records().iter().map(|r| r.start.to_string()).collect();
    assert_eq!(starts, ["2024-03-31", "2024-03-01", "2024-02-01"]);
    assert_eq!(store.records()[1].offer, "Até 60€ de oferta");

    let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(html.matches("<td><a href=").count(), 3);
    assert!(html.contains("Oferta de fevereiro"));

    let rss = std::fs::read_to_string(dir.path().join("rss.xml")).unwrap();
    let channel = rss::Channel::read_from(rss.as_bytes()).unwrap();
    let titles: Vec<_> = channel.items().iter().filter_map(|i| i.title()).collect();
    // the 1–15 March window ended before `now`
    assert_eq!(titles, ["Oferta Extra"]);
}

#[tokio::test]
async fn rerunning_adds_nothing_new() {
    let (_dir, config, fetcher) = setup("[]");

    let first = run(&config, fetcher.clone(), now()).await.unwrap();
    assert_eq!(first.added, 2);
    let saved = std::fs::read_to_string(&config.db_path).unwrap();

    let second = run(&config, fetcher, now()).await.unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.total, 2);
    assert_eq!(std::fs::read_to_string(&config.db_path).unwrap(), saved);
}

#[tokio::test]
async fn unreadable_store_aborts_before_writing_outputs() {
    let (dir, config, fetcher) = setup("not json at all");

    let err = run(&config, fetcher, now()).await.unwrap_err();
    assert!(format!("{err:#}").contains("loading offer store"));
    assert!(!dir.path().join("index.html").exists());
    assert!(!dir.path().join("rss.xml").exists());
    assert_eq!(
        std::fs::read_to_string(&config.db_path).unwrap(),
        "not json at all"
    );
}

#[tokio::test]
async fn missing_store_is_fatal() {
    let (dir, config, fetcher) = setup("[]");
    std::fs::remove_file(&config.db_path).unwrap();

    assert!(run(&config, fetcher, now()).await.is_err());
    assert!(!dir.path().join("index.html").exists());
}

#[tokio::test]
async fn unwritable_output_is_fatal_after_store_is_saved() {
    let (dir, mut config, fetcher) = setup("[]");
    config.rss_path = dir.path().join("missing-dir").join("rss.xml");

    let err = run(&config, fetcher, now()).await.unwrap_err();
    assert!(format!("{err:#}").contains("rss.xml"));
    assert_eq!(Store::load(&config.db_path).await.unwrap().len(), 2);
}
