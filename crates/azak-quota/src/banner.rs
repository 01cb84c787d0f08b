//! What the view-limit banner and donation notice should show

use crate::auth::AuthStatus;
use crate::tracker::ViewQuotaTracker;
use std::fmt;

/// Where visitors are sent to support the service
pub const SUPPORT_URL: &str = "https://buymeacoffee.com/atototo";

/// Banner shown above pages for anonymous visitors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerState {
    /// Auth still loading, or the caller is signed in
    Hidden,
    Remaining {
        remaining: usize,
        viewed: usize,
        limit: usize,
    },
    Exhausted { limit: usize },
}

impl BannerState {
    pub fn for_tracker(tracker: &ViewQuotaTracker) -> Self {
        match tracker.auth_status() {
            AuthStatus::Unknown | AuthStatus::Authenticated => BannerState::Hidden,
            AuthStatus::Anonymous if tracker.is_limit_reached() => BannerState::Exhausted {
                limit: tracker.daily_limit(),
            },
            AuthStatus::Anonymous => BannerState::Remaining {
                remaining: tracker.remaining_views(),
                viewed: tracker.viewed_count(),
                limit: tracker.daily_limit(),
            },
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, BannerState::Hidden)
    }
}

impl fmt::Display for BannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BannerState::Hidden => Ok(()),
            BannerState::Remaining {
                remaining,
                viewed,
                limit,
            } => write!(
                f,
                "{remaining} free stock views left today ({viewed}/{limit}). \
                 Support or log in for unlimited access."
            ),
            BannerState::Exhausted { .. } => write!(
                f,
                "You've used all of today's free views. \
                 Support ({SUPPORT_URL}) or log in to keep going."
            ),
        }
    }
}

/// Contents of the donation modal while it is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationNotice {
    pub viewed: usize,
    pub limit: usize,
}

impl DonationNotice {
    pub fn support_url(&self) -> &'static str {
        SUPPORT_URL
    }
}

impl fmt::Display for DonationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { viewed, limit } = self;
        writeln!(f, "You've used today's free views ({viewed}/{limit}).")?;
        writeln!(f, "Buy us a coffee: {SUPPORT_URL}")?;
        write!(f, "Free views refill tomorrow.")
    }
}

impl ViewQuotaTracker {
    /// Notice to render while the donation modal is open
    pub fn donation_notice(&self) -> Option<DonationNotice> {
        self.show_donation_modal().then(|| DonationNotice {
            viewed: self.viewed_count(),
            limit: self.daily_limit(),
        })
    }
}
