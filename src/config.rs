use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const DB_FILE: &str = "db.json";
pub const HTML_FILE: &str = "index.html";
pub const RSS_FILE: &str = "rss.xml";

const WIZINK_URLS: [&str; 5] = [
    "https://www.wizink.pt/mail/landing/aderir-cartao-de-credito-flash.html",
    "https://www.wizink.pt/mail/landing/aderir-cartao-de-credito-flash-extra.html",
    "https://www.wizink.pt/mail/landing/aderir-cartao-de-credito-flash-especial.html",
    "https://www.wizink.pt/mail/landing/aderir-cartao-de-credito-wizink-flex-flash.html",
    "https://www.wizink.pt/public/campanha-especial",
];

const PT_MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Ordered month names, lowercase. Only used for name -> month number lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthVocabulary {
    names: Vec<String>,
}

impl MonthVocabulary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|n| n.into().to_lowercase()).collect(),
        }
    }

    /// 1-based month number for `name`, or `None` if it isn't in the vocabulary.
    pub fn index_of(&self, name: &str) -> Option<u32> {
        let needle = name.trim().to_lowercase();
        self.names
            .iter()
            .position(|m| *m == needle)
            .map(|ix| ix as u32 + 1)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for MonthVocabulary {
    fn default() -> Self {
        Self::new(PT_MONTHS)
    }
}

/// Channel metadata shared by the HTML page and the feed.
#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub title: String,
    pub link: String,
    pub description: String,
    pub page_title: String,
}

impl Default for FeedMeta {
    fn default() -> Self {
        Self {
            title: "Ofertas Wizink".to_string(),
            link: "https://wizink.pt".to_string(),
            description: "Ofertas Wizink".to_string(),
            page_title: "Wizink Offers".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub urls: Vec<String>,
    pub months: MonthVocabulary,
    pub no_offer_phrase: String,
    pub offer_selector: String,
    pub interval_selector: String,
    pub feed: FeedMeta,
    pub fetch_timeout: Duration,
    pub db_path: PathBuf,
    pub html_path: PathBuf,
    pub rss_path: PathBuf,
}

impl Config {
    /// Default configuration with the store and both outputs under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            db_path: dir.join(DB_FILE),
            html_path: dir.join(HTML_FILE),
            rss_path: dir.join(RSS_FILE),
            ..Self::default()
        }
    }

    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: WIZINK_URLS.iter().map(|u| u.to_string()).collect(),
            months: MonthVocabulary::default(),
            no_offer_phrase: "não temos nenhuma campanha especial, de momento".to_string(),
            offer_selector: ".offer__name".to_string(),
            interval_selector: ".conditions__text > ul > li".to_string(),
            feed: FeedMeta::default(),
            fetch_timeout: Duration::from_secs(30),
            db_path: PathBuf::from(DB_FILE),
            html_path: PathBuf::from(HTML_FILE),
            rss_path: PathBuf::from(RSS_FILE),
        }
    }
}
