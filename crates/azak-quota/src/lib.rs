//! Daily free-view quota for azak stock reports
//!
//! Anonymous visitors may open a limited number of distinct stock detail pages
//! per calendar day; signed-in users are never limited. This crate holds the
//! quota logic and the adapters it needs:
//!
//! - [`ViewQuotaTracker`]: admission, remaining views, donation-modal flag
//! - [`QuotaStorage`]: durable key-value persistence ([`MemoryStorage`], [`FileStorage`])
//! - [`AuthStatusProvider`]: auth state read at call time ([`SharedAuthStatus`])
//! - [`Clock`]: the day boundary ([`LocalClock`], [`FixedClock`])
//! - [`BannerState`] / [`DonationNotice`]: what the UI should show
//!
//! # Example
//!
//! ```
//! use azak_quota::{
//!     AuthStatus, MemoryStorage, SharedAuthStatus, StockCode, ViewDecision, ViewQuotaTracker,
//! };
//!
//! let auth = SharedAuthStatus::new(AuthStatus::Anonymous);
//! let mut tracker = ViewQuotaTracker::builder(MemoryStorage::new(), auth.clone()).build();
//!
//! let samsung = StockCode::new("005930").unwrap();
//! assert_eq!(tracker.enter_stock_detail(&samsung), ViewDecision::Granted);
//! assert_eq!(tracker.remaining_views(), 2);
//! ```

pub mod auth;
pub mod banner;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod record;
pub mod storage;
pub mod tracker;

pub use auth::{AuthStatus, AuthStatusProvider, SharedAuthStatus};
pub use banner::{BannerState, DonationNotice, SUPPORT_URL};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{DAILY_VIEW_LIMIT, QuotaConfig};
pub use error::{QuotaError, Result};
pub use gate::{StockCode, ViewDecision};
pub use record::QuotaRecord;
pub use storage::{FileStorage, MemoryStorage, QuotaStorage};
pub use tracker::{ViewQuotaTracker, ViewQuotaTrackerBuilder};
