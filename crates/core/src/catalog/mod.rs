//! Read-only reward catalog: cards, retailers, the keyword table and the quarterly calendar.

pub mod contract;
pub mod domains;
pub mod keywords;
pub mod quarterly;
pub mod source;

#[cfg(test)]
pub(crate) mod fixtures;

pub use contract::CatalogDocument;
pub use domains::DomainIndex;
pub use keywords::{KeywordRow, KeywordTable};
pub use quarterly::{QuarterlyCalendar, QuarterlyRow};
pub use source::{CatalogSource, JsonFileCatalogSource};

use crate::domain::{Card, LimitedTimeOffer, Retailer, RewardRule};
use anyhow::Context;
use chrono::NaiveDate;
use contract::{RawCard, RawRetailer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// Outcome of loading a catalog document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub cards_loaded: usize,
    pub cards_skipped: usize,
    pub retailers_loaded: usize,
    pub retailers_skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<Card>,
    retailers: Vec<Retailer>,
    keywords: KeywordTable,
    quarterly: QuarterlyCalendar,
    domains: DomainIndex,
}

impl Catalog {
    pub fn new(
        cards: Vec<Card>,
        retailers: Vec<Retailer>,
        keywords: KeywordTable,
        quarterly: QuarterlyCalendar,
    ) -> Self {
        let domains = DomainIndex::build(&retailers);
        Self {
            cards,
            retailers,
            keywords,
            quarterly,
            domains,
        }
    }

    /// No cards or retailers; identification still has the built-in keyword table.
    pub fn empty() -> Self {
        Self::new(
            Vec::new(),
            Vec::new(),
            KeywordTable::builtin(),
            QuarterlyCalendar::builtin(),
        )
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<(Self, LoadReport)> {
        let document: CatalogDocument =
            serde_json::from_str(raw).context("catalog is not a valid catalog document")?;
        Ok(Self::from_document(document))
    }

    /// Validates every entry independently; invalid ones are logged and skipped.
    pub fn from_document(document: CatalogDocument) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        let mut seen_ids = BTreeSet::new();
        let mut cards = Vec::with_capacity(document.cards.len());
        for (idx, value) in document.cards.into_iter().enumerate() {
            match parse_card(value) {
                Ok(card) if seen_ids.insert(card.id.clone()) => cards.push(card),
                Ok(card) => {
                    tracing::warn!(index = idx, card_id = %card.id, "skipping duplicate card id");
                    report.cards_skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(index = idx, error = %format!("{e:#}"), "skipping invalid card");
                    report.cards_skipped += 1;
                }
            }
        }
        report.cards_loaded = cards.len();

        let mut retailers = Vec::with_capacity(document.retailers.len());
        for (idx, value) in document.retailers.into_iter().enumerate() {
            match parse_retailer(value) {
                Ok(retailer) => retailers.push(retailer),
                Err(e) => {
                    tracing::warn!(index = idx, error = %format!("{e:#}"), "skipping invalid retailer");
                    report.retailers_skipped += 1;
                }
            }
        }
        report.retailers_loaded = retailers.len();

        let keywords = document
            .keywords
            .map(KeywordTable::new)
            .unwrap_or_else(KeywordTable::builtin);
        let quarterly = document
            .quarterly_calendar
            .map(QuarterlyCalendar::new)
            .unwrap_or_else(QuarterlyCalendar::builtin);

        tracing::info!(
            cards_loaded = report.cards_loaded,
            cards_skipped = report.cards_skipped,
            retailers_loaded = report.retailers_loaded,
            retailers_skipped = report.retailers_skipped,
            "catalog loaded"
        );

        (Self::new(cards, retailers, keywords, quarterly), report)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn retailers(&self) -> &[Retailer] {
        &self.retailers
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    pub fn quarterly(&self) -> &QuarterlyCalendar {
        &self.quarterly
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn rewards_for<'a>(&self, card: &'a Card) -> &'a [RewardRule] {
        &card.rewards
    }

    /// Offers of `card` that are active on `eval_date`.
    pub fn limited_offers_for<'a>(
        &self,
        card: &'a Card,
        eval_date: NaiveDate,
    ) -> Vec<&'a LimitedTimeOffer> {
        card.limited_time_offers
            .iter()
            .filter(|o| o.is_active_on(eval_date))
            .collect()
    }

    /// `host` is a normalized host; `path` the lowercased URL path.
    pub fn retailer_for_domain(&self, host: &str, path: &str) -> Option<&Retailer> {
        self.domains
            .lookup(host, path)
            .and_then(|idx| self.retailers.get(idx))
    }

    /// Mean average transaction across retailers in `category` that state one.
    pub fn average_transaction_for(&self, category: &str) -> Option<f64> {
        let values: Vec<f64> = self
            .retailers
            .iter()
            .filter(|r| r.category == category)
            .filter_map(|r| r.average_transaction)
            .collect();
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn parse_card(value: Value) -> anyhow::Result<Card> {
    serde_json::from_value::<RawCard>(value)
        .context("malformed card entry")?
        .validate_and_into_card()
}

fn parse_retailer(value: Value) -> anyhow::Result<Retailer> {
    serde_json::from_value::<RawRetailer>(value)
        .context("malformed retailer entry")?
        .validate_and_into_retailer()
}

/// Shared, swappable catalog. Readers hold an `Arc` to one whole snapshot, so a reload never
/// shows them a half-updated catalog.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    pub fn replace(&self, catalog: Catalog) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(catalog);
    }
}
