//! Interval reconstruction: turning the transition log back into time spent
//! per status.
//!
//! The log is walked pairwise. Each pair of adjacent records bounds a
//! candidate interval, which only counts if the status the earlier record says
//! it *ended in* is the status the later record says it *started from*. Every
//! other pair is dropped without comment: session boundaries, missed events,
//! restarts and duplicate snapshots all fall out of the continuity check.

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
  Error, Result,
  record::TransitionRecord,
  status::{Status, StatusMark},
};

/// A continuity-checked span of time spent in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedInterval {
  pub status:     Status,
  pub duration:   TimeDelta,
  /// Timestamp of the record that opened the interval.
  pub started_at: DateTime<Utc>,
  /// Timestamp of the record that closed it.
  pub ended_at:   DateTime<Utc>,
}

/// Reconstruct the valid intervals of one scope's history.
///
/// `records` must be ascending by timestamp and belong to a single
/// `(user, guild)` scope; a violation of either is a data-integrity error and
/// nothing is returned. At most `records.len() - 1` intervals are produced.
pub fn reconstruct(records: &[TransitionRecord]) -> Result<Vec<ValidatedInterval>> {
  let Some(first) = records.first() else {
    return Ok(Vec::new());
  };
  let scope = first.scope();

  let mut intervals = Vec::with_capacity(records.len() - 1);
  for (offset, pair) in records.windows(2).enumerate() {
    let (previous, current) = (&pair[0], &pair[1]);
    let index = offset + 1;

    if current.scope() != scope {
      return Err(Error::ScopeMismatch {
        index,
        user_id: current.user_id,
        guild_id: current.guild_id,
      });
    }
    if current.timestamp < previous.timestamp {
      return Err(Error::OutOfOrder {
        index,
        previous: previous.timestamp,
        current: current.timestamp,
      });
    }

    if let Some(status) = continuity(previous.after, current.before) {
      intervals.push(ValidatedInterval {
        status,
        duration: current.timestamp - previous.timestamp,
        started_at: previous.timestamp,
        ended_at: current.timestamp,
      });
    }
  }

  Ok(intervals)
}

/// The status held between two records, if the records agree on it.
fn continuity(ended_in: StatusMark, started_from: StatusMark) -> Option<Status> {
  match (ended_in, started_from) {
    (StatusMark::Known(ended), StatusMark::Known(started)) if ended == started => {
      Some(ended)
    }
    _ => None,
  }
}
