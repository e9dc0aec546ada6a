use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Consider a category stale after 1 hour.
/// Balances freshness with not refetching slowly-changing schedule data.
const STALE_MINUTES: i64 = 60;

/// Metadata recorded after each successful reconciliation of a category.
///
/// Stamps live outside the category keyspaces and are never read by the
/// merge algorithm; they exist so callers can show data age and decide
/// when a refresh is due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStamp {
    pub synced_at: DateTime<Utc>,
    /// Number of distinct keys written by the pass that produced this stamp.
    pub record_count: usize,
}

impl SyncStamp {
    pub fn new(record_count: usize) -> Self {
        Self {
            synced_at: Utc::now(),
            record_count,
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.synced_at).num_minutes()
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > STALE_MINUTES
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}
