pub mod config;
pub mod dates;
pub mod fetch;
pub mod page;
pub mod render;
pub mod runner;
pub mod store;

pub use config::{Config, FeedMeta, MonthVocabulary};
pub use dates::{DateRange, DateRangeError, DateRangeParser};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use page::{Extraction, ExtractError, PageExtractor};
pub use runner::{run, scrape_page, RunReport, ScrapeError};
pub use store::{OfferRecord, Store, StoreError};
