//! Contact counts.

use crate::store::ContactStore;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Total contacts and contacts added today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactStats {
    pub total: usize,
    pub today: usize,
}

/// Midnight UTC of the calendar day containing `now`.
///
/// "Today" is the UTC date, matching a comparison of ISO-8601 date prefixes.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

impl ContactStore {
    /// Counts for the current UTC day.
    pub async fn stats(&self) -> ContactStats {
        self.stats_at(Utc::now()).await
    }

    /// Counts for the UTC day containing `now`.
    ///
    /// Both numbers come from one snapshot, so `today <= total` always holds.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> ContactStats {
        let (total, today) = self.snapshot_counts(start_of_day(now)).await;
        ContactStats { total, today }
    }
}
