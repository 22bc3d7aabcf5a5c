//! Bookkeeping for the periodic "is there a newer release" check.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often the command layer should look for a newer release.
pub const DEFAULT_UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// When the CLI last checked for a newer released version.
///
/// Stored in `update_check.yml` under the key `lastCheckedAt` as an RFC 3339
/// timestamp. A missing or unreadable file means "never checked".
///
/// # Example
///
/// ```rust
/// use circleci_core::{UpdateCheckState, DEFAULT_UPDATE_CHECK_INTERVAL};
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// assert!(UpdateCheckState::default().is_due(now, DEFAULT_UPDATE_CHECK_INTERVAL));
///
/// let state = UpdateCheckState::checked_at(now - Duration::hours(1));
/// assert!(!state.is_due(now, DEFAULT_UPDATE_CHECK_INTERVAL));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckState {
    /// When the last check completed, or `None` if it never ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl UpdateCheckState {
    /// Records a check completed at `at`.
    #[must_use]
    pub const fn checked_at(at: DateTime<Utc>) -> Self {
        Self {
            last_checked_at: Some(at),
        }
    }

    /// Returns `true` if a new check should run at `now`.
    ///
    /// A timestamp in the future is treated as stale so a skewed clock cannot
    /// suppress checks indefinitely.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        let Some(last) = self.last_checked_at else {
            return true;
        };
        if last > now {
            return true;
        }
        (now - last)
            .to_std()
            .map_or(true, |elapsed| elapsed >= interval)
    }
}
