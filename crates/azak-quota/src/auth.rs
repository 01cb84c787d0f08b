//! Authentication status as seen by the quota

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Caller authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Auth has not resolved yet
    #[default]
    Unknown,
    Authenticated,
    Anonymous,
}

impl AuthStatus {
    /// Map the host's `isAuthenticated` / `loading` pair
    pub fn from_signals(is_authenticated: bool, loading: bool) -> Self {
        if loading {
            AuthStatus::Unknown
        } else if is_authenticated {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }

    pub fn is_authenticated(self) -> bool {
        self == AuthStatus::Authenticated
    }

    pub fn is_loading(self) -> bool {
        self == AuthStatus::Unknown
    }
}

/// Supplies the current auth status; read at call time, never subscribed to
#[cfg_attr(test, mockall::automock)]
pub trait AuthStatusProvider: Send + Sync {
    fn status(&self) -> AuthStatus;
}

impl AuthStatusProvider for AuthStatus {
    fn status(&self) -> AuthStatus {
        *self
    }
}

/// Handle the host updates once auth resolves
#[derive(Debug, Clone, Default)]
pub struct SharedAuthStatus {
    inner: Arc<RwLock<AuthStatus>>,
}

impl SharedAuthStatus {
    pub fn new(status: AuthStatus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(status)),
        }
    }

    pub fn set(&self, status: AuthStatus) {
        match self.inner.write() {
            Ok(mut current) => *current = status,
            Err(poisoned) => *poisoned.into_inner() = status,
        }
    }

    /// Convenience for hosts that expose the two raw signals
    pub fn set_signals(&self, is_authenticated: bool, loading: bool) {
        self.set(AuthStatus::from_signals(is_authenticated, loading));
    }
}

impl AuthStatusProvider for SharedAuthStatus {
    fn status(&self) -> AuthStatus {
        match self.inner.read() {
            Ok(status) => *status,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
