use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read offer store {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode offer store {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode offer store")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write offer store {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One offer window scraped from one page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OfferRecord {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub url: String,
    pub offer: String,
}

impl OfferRecord {
    /// Dedup key; the offer label is not part of it.
    pub fn identity(&self) -> (NaiveDate, NaiveDate, &str) {
        (self.start, self.end, self.url.as_str())
    }

    /// An offer is valid through 23:59:59 UTC of its end date.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let last_second = self.end.and_time(NaiveTime::MIN).and_utc() + Duration::seconds(86_399);
        last_second < now
    }

    /// Stable feed item id: hex sha256 of `{url}#{start}`.
    pub fn feed_guid(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}#{}", self.url, self.start).as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// The persisted list of offers, kept newest-start first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    records: Vec<OfferRecord>,
}

impl Store {
    pub fn new(records: Vec<OfferRecord>) -> Self {
        Self { records }
    }

    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&contents).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes next to `path` first and renames over it, so a failed write never
    /// leaves a truncated store behind.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let body = self.to_json().map_err(StoreError::Encode)?;
        let tmp = path.with_extension("json.tmp");
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        tokio::fs::write(&tmp, body).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(write_err)?;
        Ok(())
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(contents)?))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }

    /// Appends every incoming record whose `(start, end, url)` isn't stored yet,
    /// in incoming order. Returns how many were added.
    pub fn merge<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = Option<OfferRecord>>,
    {
        let mut added = 0;
        for record in incoming.into_iter().flatten() {
            if self
                .records
                .iter()
                .any(|existing| existing.identity() == record.identity())
            {
                continue;
            }
            self.records.push(record);
            added += 1;
        }
        added
    }

    /// Stable, so records sharing a start keep their relative order.
    pub fn sort_by_start_desc(&mut self) {
        self.records.sort_by(|a, b| b.start.cmp(&a.start));
    }

    pub fn records(&self) -> &[OfferRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
