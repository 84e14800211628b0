//! Summing reconstructed intervals into per-status totals and proportions.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, reconstruct::ValidatedInterval, status::Status};

// ─── Totals ──────────────────────────────────────────────────────────────────

/// Time spent per status. Statuses with no valid interval are absent rather
/// than zero. Iterates in chart order (online, idle, dnd, offline).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTotals {
  durations: BTreeMap<Status, TimeDelta>,
}

/// Sum `intervals` grouped by status.
pub fn aggregate(intervals: &[ValidatedInterval]) -> StatusTotals {
  let mut durations = BTreeMap::new();
  for interval in intervals {
    *durations.entry(interval.status).or_insert_with(TimeDelta::zero) +=
      interval.duration;
  }
  StatusTotals { durations }
}

impl StatusTotals {
  pub fn get(&self, status: Status) -> Option<TimeDelta> {
    self.durations.get(&status).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Status, TimeDelta)> + '_ {
    self.durations.iter().map(|(status, d)| (*status, *d))
  }

  pub fn is_empty(&self) -> bool { self.durations.is_empty() }

  pub fn total(&self) -> TimeDelta { self.durations.values().copied().sum() }

  /// Each status's share of the total.
  ///
  /// Returns [`Error::NoData`] when there is nothing to divide: no intervals
  /// at all, or only zero-length ones.
  pub fn to_proportions(&self) -> Result<Proportions> {
    let total = self.total();
    if total <= TimeDelta::zero() {
      return Err(Error::NoData);
    }

    let total = seconds(total);
    Ok(
      self
        .iter()
        .map(|(status, d)| (status, seconds(d) / total))
        .collect(),
    )
  }
}

/// Fractional seconds at full precision. Durations here are never negative.
fn seconds(d: TimeDelta) -> f64 { d.to_std().map_or(0.0, |d| d.as_secs_f64()) }

// ─── Proportions ─────────────────────────────────────────────────────────────

/// Fraction of observed time per status; values sum to at most 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proportions(BTreeMap<Status, f64>);

impl Proportions {
  /// The share for `status`, zero when it was never observed.
  pub fn get(&self, status: Status) -> f64 {
    self.0.get(&status).copied().unwrap_or(0.0)
  }

  pub fn iter(&self) -> impl Iterator<Item = (Status, f64)> + '_ {
    self.0.iter().map(|(status, share)| (*status, *share))
  }
}

impl FromIterator<(Status, f64)> for Proportions {
  fn from_iter<I: IntoIterator<Item = (Status, f64)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone as _, Utc};

  use super::*;

  fn interval(status: Status, minutes: i64) -> ValidatedInterval {
    let started_at: DateTime<Utc> =
      Utc.with_ymd_and_hms(2023, 3, 1, 12, 0, 0).unwrap();
    ValidatedInterval {
      status,
      duration: TimeDelta::minutes(minutes),
      started_at,
      ended_at: started_at + TimeDelta::minutes(minutes),
    }
  }

  #[test]
  fn sums_by_status_and_omits_absent_ones() {
    let totals = aggregate(&[
      interval(Status::Online, 15),
      interval(Status::Idle, 5),
      interval(Status::Online, 10),
    ]);

    assert_eq!(totals.get(Status::Online), Some(TimeDelta::minutes(25)));
    assert_eq!(totals.get(Status::Idle), Some(TimeDelta::minutes(5)));
    assert_eq!(totals.get(Status::Dnd), None);
    assert_eq!(totals.total(), TimeDelta::minutes(30));

    let order: Vec<_> = totals.iter().map(|(s, _)| s).collect();
    assert_eq!(order, [Status::Online, Status::Idle]);
  }

  #[test]
  fn proportions_divide_by_the_total() {
    let totals = aggregate(&[
      interval(Status::Online, 30),
      interval(Status::Dnd, 10),
      interval(Status::Offline, 60),
    ]);

    let shares = totals.to_proportions().unwrap();
    assert!((shares.get(Status::Online) - 0.3).abs() < 1e-9);
    assert!((shares.get(Status::Dnd) - 0.1).abs() < 1e-9);
    assert!((shares.get(Status::Offline) - 0.6).abs() < 1e-9);
    assert_eq!(shares.get(Status::Idle), 0.0);

    let sum: f64 = shares.iter().map(|(_, share)| share).sum();
    assert!(sum <= 1.0 + 1e-9);
  }

  #[test]
  fn nothing_to_show_is_no_data() {
    let empty = aggregate(&[]);
    assert!(empty.is_empty());
    assert!(matches!(empty.to_proportions(), Err(Error::NoData)));

    let zero = aggregate(&[interval(Status::Idle, 0)]);
    assert!(!zero.is_empty());
    assert!(matches!(zero.to_proportions(), Err(Error::NoData)));
  }

  #[test]
  fn sub_millisecond_history_still_has_proportions() {
    let at = Utc.with_ymd_and_hms(2023, 3, 1, 12, 0, 0).unwrap();
    let totals = aggregate(&[
      ValidatedInterval {
        status:     Status::Online,
        duration:   TimeDelta::microseconds(500),
        started_at: at,
        ended_at:   at + TimeDelta::microseconds(500),
      },
      ValidatedInterval {
        status:     Status::Idle,
        duration:   TimeDelta::microseconds(1500),
        started_at: at + TimeDelta::microseconds(500),
        ended_at:   at + TimeDelta::microseconds(2000),
      },
    ]);

    let shares = totals.to_proportions().unwrap();
    assert!((shares.get(Status::Online) - 0.25).abs() < 1e-9);
    assert!((shares.get(Status::Idle) - 0.75).abs() < 1e-9);
  }

  #[test]
  fn proportions_serialise_as_a_status_map() {
    let shares: Proportions =
      [(Status::Online, 0.75), (Status::Idle, 0.25)].into_iter().collect();
    let json = serde_json::to_value(&shares).unwrap();
    assert_eq!(json, serde_json::json!({ "online": 0.75, "idle": 0.25 }));
  }
}
