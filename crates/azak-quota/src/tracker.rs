//! Daily view quota tracker
//!
//! Anonymous visitors get [`DAILY_VIEW_LIMIT`] distinct stock-detail views per
//! calendar day. Re-opening a stock already seen today is free, and
//! authenticated callers are never counted.
//!
//! The record is loaded once at construction and re-checked against the clock
//! on every read: a record from another day reads as empty and is replaced on
//! the next admission. No timer is involved.
//!
//! Persistence failures never escape. A failed or malformed read starts the
//! day fresh, a failed write keeps the in-memory admission. Two processes
//! sharing one store can both admit the last free view; that race is accepted
//! for a soft limit.

use crate::auth::{AuthStatus, AuthStatusProvider};
use crate::clock::{Clock, LocalClock};
use crate::config::{DAILY_VIEW_LIMIT, DEFAULT_STORAGE_KEY, QuotaConfig};
use crate::record::QuotaRecord;
use crate::storage::QuotaStorage;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Gate for metered stock-detail views
pub struct ViewQuotaTracker {
    storage: Box<dyn QuotaStorage>,
    auth: Box<dyn AuthStatusProvider>,
    clock: Box<dyn Clock>,
    storage_key: String,
    record: QuotaRecord,
    modal_open: bool,
}

impl ViewQuotaTracker {
    /// Start building a tracker over `storage`, reading auth from `auth`
    pub fn builder(
        storage: impl QuotaStorage + 'static,
        auth: impl AuthStatusProvider + 'static,
    ) -> ViewQuotaTrackerBuilder {
        ViewQuotaTrackerBuilder {
            storage: Box::new(storage),
            auth: Box::new(auth),
            clock: Box::new(LocalClock),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    pub fn daily_limit(&self) -> usize {
        DAILY_VIEW_LIMIT
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.auth.status()
    }

    /// Today's date according to the tracker's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Today's record, or `None` if the loaded one belongs to another day
    fn current(&self) -> Option<&QuotaRecord> {
        let today = self.clock.today();
        self.record.is_for(today).then_some(&self.record)
    }

    pub fn viewed_count(&self) -> usize {
        self.current().map_or(0, QuotaRecord::viewed_count)
    }

    pub fn remaining_views(&self) -> usize {
        DAILY_VIEW_LIMIT.saturating_sub(self.viewed_count())
    }

    /// `>=` rather than `==`: a tampered record may hold more than the limit.
    pub fn is_limit_reached(&self) -> bool {
        self.viewed_count() >= DAILY_VIEW_LIMIT
    }

    /// Stock codes admitted today
    pub fn viewed_codes(&self) -> Vec<String> {
        self.current()
            .map(|r| r.viewed_codes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_viewed(&self, code: &str) -> bool {
        self.current().is_some_and(|r| r.contains(code))
    }

    /// Whether `code` may be viewed right now; no side effects
    ///
    /// Allows everything while auth is still loading so the page does not
    /// flash a block before it resolves.
    pub fn can_view(&self, code: &str) -> bool {
        match self.auth.status() {
            AuthStatus::Unknown | AuthStatus::Authenticated => true,
            AuthStatus::Anonymous => self.has_viewed(code) || !self.is_limit_reached(),
        }
    }

    /// Admit a view of `code`, returning whether it is allowed
    ///
    /// Only authenticated callers bypass counting; an unresolved auth state is
    /// counted like an anonymous one. The view that uses up the last free slot
    /// succeeds without opening the modal; the next new code is rejected and
    /// opens it.
    pub fn record_view(&mut self, code: &str) -> bool {
        if self.auth.status().is_authenticated() {
            return true;
        }

        self.roll_over();

        if self.record.contains(code) {
            return true;
        }

        if self.record.viewed_count() >= DAILY_VIEW_LIMIT {
            info!(
                key = %self.storage_key,
                code,
                viewed = self.record.viewed_count(),
                "daily view limit reached"
            );
            self.modal_open = true;
            return false;
        }

        self.record.insert(code);
        debug!(
            key = %self.storage_key,
            code,
            viewed = self.record.viewed_count(),
            remaining = DAILY_VIEW_LIMIT.saturating_sub(self.record.viewed_count()),
            "view admitted"
        );
        self.persist();
        true
    }

    pub fn show_donation_modal(&self) -> bool {
        self.modal_open
    }

    pub fn open_donation_modal(&mut self) {
        self.modal_open = true;
    }

    pub fn close_donation_modal(&mut self) {
        self.modal_open = false;
    }

    fn roll_over(&mut self) {
        let today = self.clock.today();
        if !self.record.is_for(today) {
            debug!(
                key = %self.storage_key,
                from = %self.record.day(),
                to = %today,
                "quota day rolled over"
            );
            self.record = QuotaRecord::empty(today);
        }
    }

    fn persist(&self) {
        let result = self
            .record
            .to_json()
            .and_then(|raw| self.storage.set(&self.storage_key, &raw));

        if let Err(e) = result {
            warn!(key = %self.storage_key, error = %e, "failed to save view limit data");
        }
    }
}

/// Builder for [`ViewQuotaTracker`]
pub struct ViewQuotaTrackerBuilder {
    storage: Box<dyn QuotaStorage>,
    auth: Box<dyn AuthStatusProvider>,
    clock: Box<dyn Clock>,
    storage_key: String,
}

impl ViewQuotaTrackerBuilder {
    /// Replace the wall clock
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set the key the record is persisted under
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Take settings from a validated configuration
    pub fn config(self, config: &QuotaConfig) -> Self {
        self.storage_key(config.storage_key.clone())
    }

    /// Load today's record and build the tracker
    pub fn build(self) -> ViewQuotaTracker {
        let today = self.clock.today();
        let record = load_record(self.storage.as_ref(), &self.storage_key, today);

        ViewQuotaTracker {
            storage: self.storage,
            auth: self.auth,
            clock: self.clock,
            storage_key: self.storage_key,
            record,
            modal_open: false,
        }
    }
}

fn load_record(storage: &dyn QuotaStorage, key: &str, today: NaiveDate) -> QuotaRecord {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return QuotaRecord::empty(today),
        Err(e) => {
            warn!(key, error = %e, "failed to read view limit data, starting fresh");
            return QuotaRecord::empty(today);
        }
    };

    match QuotaRecord::from_json(&raw) {
        Ok(record) if record.is_for(today) => record,
        Ok(record) => {
            debug!(key, stale = %record.day(), today = %today, "discarding stale view limit data");
            QuotaRecord::empty(today)
        }
        Err(e) => {
            warn!(key, error = %e, "failed to parse view limit data, starting fresh");
            QuotaRecord::empty(today)
        }
    }
}
