//! Synthetic records derived from live member statuses.
//!
//! Session boundaries close off the log at process start and stop so that
//! time during which nothing was observed never counts. Snapshots re-record a
//! member's current status at query time so the open interval reaches "now".

use std::future::Future;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::{
  record::{Scope, TransitionRecord},
  status::Status,
};

// ─── Directory ───────────────────────────────────────────────────────────────

/// The platform's view of a guild's members and their live statuses.
pub trait MemberDirectory: Send + Sync {
  /// A failed platform lookup.
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every member currently known in `guild_id`.
  fn members(
    &self,
    guild_id: u64,
  ) -> impl Future<Output = Result<Vec<u64>, Self::Error>> + Send + '_;

  /// The live status of one member.
  fn current_status(
    &self,
    guild_id: u64,
    member_id: u64,
  ) -> impl Future<Output = Result<Status, Self::Error>> + Send + '_;
}

// ─── Boundaries ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
  /// Process start: the status before is unknown.
  SessionStart,
  /// Process stop: the status after is unknown.
  SessionEnd,
}

impl Boundary {
  pub fn record(
    self,
    scope: Scope,
    status: Status,
    at: DateTime<Utc>,
  ) -> TransitionRecord {
    match self {
      Self::SessionStart => TransitionRecord::session_start(scope, status, at),
      Self::SessionEnd => TransitionRecord::session_end(scope, status, at),
    }
  }
}

/// A member whose status could not be looked up; no record was produced for
/// them.
#[derive(Debug)]
pub struct LookupFailure<E> {
  pub member_id: u64,
  pub error:     E,
}

/// The outcome of generating one boundary for a guild.
#[derive(Debug)]
pub struct BoundaryBatch<E> {
  /// One record per member whose lookup succeeded, in member-list order.
  pub records:  Vec<TransitionRecord>,
  pub failures: Vec<LookupFailure<E>>,
}

/// Generate `boundary` records for every member of `guild_id`.
///
/// Member lookups run concurrently. A failed lookup only drops that member's
/// record; the error is returned only if the member list itself is
/// unavailable.
pub async fn generate<D: MemberDirectory>(
  directory: &D,
  guild_id: u64,
  boundary: Boundary,
  at: DateTime<Utc>,
) -> Result<BoundaryBatch<D::Error>, D::Error> {
  let members = directory.members(guild_id).await?;

  let lookups = members.iter().map(|&member_id| async move {
    (member_id, directory.current_status(guild_id, member_id).await)
  });

  let mut batch = BoundaryBatch {
    records:  Vec::with_capacity(members.len()),
    failures: Vec::new(),
  };
  for (member_id, result) in join_all(lookups).await {
    match result {
      Ok(status) => batch.records.push(boundary.record(
        Scope::new(member_id, guild_id),
        status,
        at,
      )),
      Err(error) => batch.failures.push(LookupFailure { member_id, error }),
    }
  }

  Ok(batch)
}

/// An early-log record for the member of `scope`, taken at `at`.
pub async fn snapshot<D: MemberDirectory>(
  directory: &D,
  scope: Scope,
  at: DateTime<Utc>,
) -> Result<TransitionRecord, D::Error> {
  let status = directory.current_status(scope.guild_id, scope.user_id).await?;
  Ok(TransitionRecord::snapshot(scope, status, at))
}
