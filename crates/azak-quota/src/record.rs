//! Persisted day-scoped quota record

use crate::clock::{format_day, parse_day};
use crate::error::{QuotaError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wire shape of the record: `{"date": "YYYY-MM-DD", "viewedStocks": [...]}`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredViewData {
    date: String,
    viewed_stocks: Vec<String>,
}

/// Stock codes viewed on one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    day: NaiveDate,
    viewed: BTreeSet<String>,
}

impl QuotaRecord {
    /// Empty record for `day`
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            viewed: BTreeSet::new(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn viewed_count(&self) -> usize {
        self.viewed.len()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.viewed.contains(code)
    }

    pub fn viewed_codes(&self) -> impl Iterator<Item = &str> {
        self.viewed.iter().map(String::as_str)
    }

    /// Add a code, returning `false` if it was already present
    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        self.viewed.insert(code.into())
    }

    pub fn is_for(&self, day: NaiveDate) -> bool {
        self.day == day
    }

    /// Parse the persisted JSON form
    ///
    /// Duplicate codes in tampered data collapse into one entry.
    pub fn from_json(raw: &str) -> Result<Self> {
        let stored: StoredViewData = serde_json::from_str(raw)?;
        let day = parse_day(&stored.date).ok_or_else(|| {
            QuotaError::MalformedRecord(format!("unparseable record date {:?}", stored.date))
        })?;

        Ok(Self {
            day,
            viewed: stored.viewed_stocks.into_iter().collect(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let stored = StoredViewData {
            date: format_day(self.day),
            viewed_stocks: self.viewed.iter().cloned().collect(),
        };
        Ok(serde_json::to_string(&stored)?)
    }
}
