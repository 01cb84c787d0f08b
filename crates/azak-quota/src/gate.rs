//! Admission for the stock detail page

use crate::error::{QuotaError, Result};
use crate::tracker::ViewQuotaTracker;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated exchange code such as `005930`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockCode(String);

impl StockCode {
    pub fn new(raw: &str) -> Result<Self> {
        let code = raw.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(QuotaError::InvalidStockCode(raw.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StockCode {
    type Error = QuotaError;

    fn try_from(raw: String) -> Result<Self> {
        Self::new(&raw)
    }
}

impl From<StockCode> for String {
    fn from(code: StockCode) -> Self {
        code.0
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of opening a stock detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewDecision {
    /// Auth has not resolved; render optimistically and ask again later
    Pending,
    Granted,
    /// Quota exhausted; the donation modal is open
    Blocked,
}

impl ViewDecision {
    pub fn is_allowed(self) -> bool {
        !matches!(self, ViewDecision::Blocked)
    }
}

impl ViewQuotaTracker {
    /// Admit a detail-page view of `code`
    ///
    /// Nothing is recorded while auth is unresolved. The host calls this again
    /// once the auth state settles.
    pub fn enter_stock_detail(&mut self, code: &StockCode) -> ViewDecision {
        if self.auth_status().is_loading() {
            return ViewDecision::Pending;
        }

        if self.record_view(code.as_str()) {
            ViewDecision::Granted
        } else {
            ViewDecision::Blocked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthStatus, SharedAuthStatus};
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn code(raw: &str) -> StockCode {
        StockCode::new(raw).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_stock_code_validation() {
        assert_eq!(code(" 005930 ").as_str(), "005930");
        assert_eq!(code("aapl").as_str(), "AAPL");
        assert!(StockCode::new("").is_err());
        assert!(StockCode::new("   ").is_err());
        assert!(StockCode::new("00-5930").is_err());
        assert!(StockCode::new("../etc").is_err());
    }

    #[test]
    fn test_stock_code_serde() {
        let parsed: StockCode = serde_json::from_str("\"000660\"").unwrap();
        assert_eq!(parsed, code("000660"));
        assert!(serde_json::from_str::<StockCode>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"000660\"");
    }

    #[test]
    fn test_pending_until_auth_resolves() {
        let auth = SharedAuthStatus::default();
        let mut tracker = ViewQuotaTracker::builder(MemoryStorage::new(), auth.clone())
            .clock(clock())
            .build();
        let samsung = code("005930");

        assert_eq!(tracker.enter_stock_detail(&samsung), ViewDecision::Pending);
        assert!(ViewDecision::Pending.is_allowed());
        assert_eq!(tracker.viewed_count(), 0);

        auth.set(AuthStatus::Anonymous);
        assert_eq!(tracker.enter_stock_detail(&samsung), ViewDecision::Granted);
        assert_eq!(tracker.viewed_count(), 1);
    }

    #[test]
    fn test_blocked_after_quota() {
        let mut tracker = ViewQuotaTracker::builder(MemoryStorage::new(), AuthStatus::Anonymous)
            .clock(clock())
            .build();

        for raw in ["005930", "000660", "035720"] {
            let decision = tracker.enter_stock_detail(&code(raw));
            assert_eq!(decision, ViewDecision::Granted, "{raw}");
        }

        let decision = tracker.enter_stock_detail(&code("207940"));
        assert_eq!(decision, ViewDecision::Blocked);
        assert!(!decision.is_allowed());
        assert!(tracker.show_donation_modal());

        let seen = code("000660");
        assert_eq!(tracker.enter_stock_detail(&seen), ViewDecision::Granted);
    }
}
