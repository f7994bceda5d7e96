//! Trending — time-windowed click aggregation over profile views.
//!
//! Profile views are logged as append-only click rows and only ever read in
//! aggregate. Ranking counts clicks per person inside the period's window;
//! people with zero qualifying clicks are excluded entirely rather than
//! ranked last.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::person::Person;

/// The time span over which clicks are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingPeriod {
  Day,
  Week,
  Month,
  All,
}

impl TrendingPeriod {
  /// The inclusive lower bound of the window ending at `now`.
  /// `All` has no lower bound.
  pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match self {
      Self::Day => Some(now - Duration::hours(24)),
      Self::Week => Some(now - Duration::days(7)),
      Self::Month => Some(now - Duration::days(30)),
      Self::All => None,
    }
  }
}

/// One ranked row of [`crate::store::BioStore::trending`] output.
///
/// Ordering is click count descending; ties break on `person_id` ascending
/// so the ranking is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingEntry {
  pub person: Person,
  pub clicks: u64,
}
