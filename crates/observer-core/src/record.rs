//! Transition records, the unit of the append-only status log.
//!
//! A record is an immutable observation that a member's status went from
//! `before` to `after` at `timestamp`. Records are never updated; durations
//! are reconstructed from adjacent records at query time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  status::{Status, StatusMark},
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The `(user, guild)` pair a status history is keyed by.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Scope {
  pub user_id:  u64,
  pub guild_id: u64,
}

impl Scope {
  pub fn new(user_id: u64, guild_id: u64) -> Self { Self { user_id, guild_id } }
}

// ─── RecordKind ──────────────────────────────────────────────────────────────

/// What produced a record, derived from which sides are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
  /// A real status change observed on the platform.
  Change,
  /// An early log: the current status re-recorded at query time.
  Snapshot,
  /// A startup boundary; nothing is known about the status before it.
  SessionStart,
  /// A shutdown boundary; nothing is known about the status after it.
  SessionEnd,
}

// ─── TransitionRecord ────────────────────────────────────────────────────────

/// One logged event. At least one of `before` and `after` is known; use the
/// constructors, which enforce this, or call [`TransitionRecord::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
  pub user_id:   u64,
  pub guild_id:  u64,
  pub before:    StatusMark,
  pub after:     StatusMark,
  /// When the transition was observed or logged.
  pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
  /// Build a record, rejecting one where both sides are unknown.
  pub fn new(
    scope: Scope,
    before: StatusMark,
    after: StatusMark,
    timestamp: DateTime<Utc>,
  ) -> Result<Self> {
    let record = Self {
      user_id: scope.user_id,
      guild_id: scope.guild_id,
      before,
      after,
      timestamp,
    };
    record.validate()?;
    Ok(record)
  }

  /// A real status change.
  pub fn change(
    scope: Scope,
    before: Status,
    after: Status,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self::known_on_both_sides(scope, before, after, timestamp)
  }

  /// Startup boundary for a member currently in `status`.
  pub fn session_start(
    scope: Scope,
    status: Status,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      user_id: scope.user_id,
      guild_id: scope.guild_id,
      before: StatusMark::Unknown,
      after: StatusMark::Known(status),
      timestamp,
    }
  }

  /// Shutdown boundary for a member currently in `status`.
  pub fn session_end(
    scope: Scope,
    status: Status,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      user_id: scope.user_id,
      guild_id: scope.guild_id,
      before: StatusMark::Known(status),
      after: StatusMark::Unknown,
      timestamp,
    }
  }

  /// Early log: `status` recorded again so the open interval reaches
  /// `timestamp`.
  pub fn snapshot(scope: Scope, status: Status, timestamp: DateTime<Utc>) -> Self {
    Self::known_on_both_sides(scope, status, status, timestamp)
  }

  fn known_on_both_sides(
    scope: Scope,
    before: Status,
    after: Status,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      user_id: scope.user_id,
      guild_id: scope.guild_id,
      before: StatusMark::Known(before),
      after: StatusMark::Known(after),
      timestamp,
    }
  }

  pub fn scope(&self) -> Scope { Scope::new(self.user_id, self.guild_id) }

  /// Reject a record that has neither side known. Stores call this before
  /// every write.
  pub fn validate(&self) -> Result<()> {
    if self.before.is_known() || self.after.is_known() {
      Ok(())
    } else {
      Err(Error::EmptyTransition {
        user_id:  self.user_id,
        guild_id: self.guild_id,
      })
    }
  }

  /// Classify the record. `None` only for an invalid, doubly-unknown record.
  pub fn kind(&self) -> Option<RecordKind> {
    match (self.before, self.after) {
      (StatusMark::Known(b), StatusMark::Known(a)) if b == a => {
        Some(RecordKind::Snapshot)
      }
      (StatusMark::Known(_), StatusMark::Known(_)) => Some(RecordKind::Change),
      (StatusMark::Unknown, StatusMark::Known(_)) => Some(RecordKind::SessionStart),
      (StatusMark::Known(_), StatusMark::Unknown) => Some(RecordKind::SessionEnd),
      (StatusMark::Unknown, StatusMark::Unknown) => None,
    }
  }
}
