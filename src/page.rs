use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use thiserror::Error;

use crate::{
    config::Config,
    dates::{DateRangeError, DateRangeParser},
    store::OfferRecord,
};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
    #[error("no element matches {0:?}")]
    MissingElement(String),
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("invalid no-offer pattern")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Offer(OfferRecord),
    /// The page says there is no campaign right now.
    NoOffer,
}

/// Pulls the offer name and validity window out of a landing page.
#[derive(Debug)]
pub struct PageExtractor {
    no_offer: Regex,
    offer_selector: Selector,
    offer_css: String,
    interval_selector: Selector,
    interval_css: String,
    dates: DateRangeParser,
}

impl PageExtractor {
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let no_offer = RegexBuilder::new(&regex::escape(&config.no_offer_phrase))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            no_offer,
            offer_selector: selector(&config.offer_selector)?,
            offer_css: config.offer_selector.clone(),
            interval_selector: selector(&config.interval_selector)?,
            interval_css: config.interval_selector.clone(),
            dates: DateRangeParser::new(config.months.clone()),
        })
    }

    pub fn extract(&self, page: &str, url: &str) -> Result<Extraction, ExtractError> {
        if self.no_offer.is_match(page) {
            return Ok(Extraction::NoOffer);
        }

        let document = Html::parse_document(page);
        let offer = first_text(&document, &self.offer_selector)
            .ok_or_else(|| ExtractError::MissingElement(self.offer_css.clone()))?;
        let interval = first_text(&document, &self.interval_selector)
            .ok_or_else(|| ExtractError::MissingElement(self.interval_css.clone()))?;

        let range = self.dates.parse(&interval)?;
        Ok(Extraction::Offer(OfferRecord {
            start: range.start,
            end: range.end,
            url: url.to_string(),
            offer,
        }))
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{css:?}: {e}")))
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
