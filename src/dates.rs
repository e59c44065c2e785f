//! Parsing of the Portuguese validity phrases found on the offer pages, e.g.
//! `"Campanha válida de 1 a 15 de março de 2024"` or `"Válida a 5 de janeiro de 2025"`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::debug;

use crate::config::MonthVocabulary;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<start_day>[0-9]{1,2}) a (?P<end_day>[0-9]{1,2}) de (?P<month>[^0-9]+?) de (?P<year>[0-9]{4})\b").unwrap()
});

static SINGLE_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<day>[0-9]{1,2}) de (?P<month>[^0-9]+?) de (?P<year>[0-9]{4})\b").unwrap()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("unparsable date range: {0:?}")]
    Unparsable(String),
    #[error("unknown month name: {0:?}")]
    UnknownMonth(String),
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("date range ends ({end}) before it starts ({start})")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive validity window of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The two phrase shapes we understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// `<startDay> a <endDay> de <month> de <year>`
    Range,
    /// `<day> de <month> de <year>`
    SingleDay,
}

/// Rules in the order they are tried. `Range` goes first: `SingleDay` also
/// matches the tail of every range phrase.
pub const RULES: [DateRule; 2] = [DateRule::Range, DateRule::SingleDay];

/// Raw fields captured by a rule, before the month name is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFields<'a> {
    pub start_day: u32,
    pub end_day: u32,
    pub month: &'a str,
    pub year: i32,
}

impl DateRule {
    fn pattern(self) -> &'static Regex {
        match self {
            DateRule::Range => &RANGE_RE,
            DateRule::SingleDay => &SINGLE_DAY_RE,
        }
    }

    pub fn capture(self, phrase: &str) -> Option<DateFields<'_>> {
        let caps = self.pattern().captures(phrase)?;
        let month = caps.name("month")?.as_str();
        let year = number(&caps, "year")?;
        match self {
            DateRule::Range => Some(DateFields {
                start_day: number(&caps, "start_day")?,
                end_day: number(&caps, "end_day")?,
                month,
                year,
            }),
            DateRule::SingleDay => {
                let day = number(&caps, "day")?;
                Some(DateFields {
                    start_day: day,
                    end_day: day,
                    month,
                    year,
                })
            }
        }
    }
}

fn number<T: std::str::FromStr>(caps: &Captures, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

#[derive(Debug, Clone, Default)]
pub struct DateRangeParser {
    months: MonthVocabulary,
}

impl DateRangeParser {
    pub fn new(months: MonthVocabulary) -> Self {
        Self { months }
    }

    pub fn parse(&self, phrase: &str) -> Result<DateRange, DateRangeError> {
        let Some((rule, fields)) = RULES
            .iter()
            .find_map(|rule| rule.capture(phrase).map(|fields| (*rule, fields)))
        else {
            return Err(DateRangeError::Unparsable(phrase.to_string()));
        };

        let month = self
            .months
            .index_of(fields.month)
            .ok_or_else(|| DateRangeError::UnknownMonth(fields.month.trim().to_string()))?;
        let start = calendar_date(fields.year, month, fields.start_day)?;
        let end = calendar_date(fields.year, month, fields.end_day)?;
        if end < start {
            return Err(DateRangeError::InvertedRange { start, end });
        }

        debug!(?rule, %start, %end, "parsed date range");
        Ok(DateRange { start, end })
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateRangeError::InvalidDate { year, month, day })
}
