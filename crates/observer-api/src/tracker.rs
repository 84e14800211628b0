//! [`StatusTracker`]: records presence changes and session boundaries, and
//! answers stats requests.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use observer_core::{
  aggregate::{Proportions, aggregate},
  boundary::{self, Boundary, MemberDirectory},
  reconstruct::reconstruct,
  record::{Scope, TransitionRecord},
  status::Status,
  store::EventStore,
};
use serde::Serialize;

use crate::error::ApiError;

// ─── Types ───────────────────────────────────────────────────────────────────

/// One presence change as delivered by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceChange {
  pub user_id:     u64,
  pub guild_id:    u64,
  pub before:      Status,
  pub after:       Status,
  pub occurred_at: DateTime<Utc>,
}

/// How a session boundary went for one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundarySummary {
  /// Members whose boundary record was written.
  pub recorded: usize,
  /// Members whose live status could not be looked up.
  pub skipped:  usize,
}

/// Time observed in each status for one user in one guild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
  pub user_id:      u64,
  pub guild_id:     u64,
  pub generated_at: DateTime<Utc>,
  /// Whole seconds per status; statuses never observed are absent.
  pub durations:    BTreeMap<Status, i64>,
  /// Sum of `durations`.
  pub total:        i64,
  /// `None` when there is nothing to show.
  pub proportions:  Option<Proportions>,
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

pub struct StatusTracker<S, D> {
  store:     S,
  directory: D,
  /// Empty means every guild is tracked.
  guilds:    BTreeSet<u64>,
}

impl<S, D> StatusTracker<S, D>
where
  S: EventStore,
  D: MemberDirectory,
{
  pub fn new(store: S, directory: D, guild_ids: impl IntoIterator<Item = u64>) -> Self {
    Self {
      store,
      directory,
      guilds: guild_ids.into_iter().collect(),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn directory(&self) -> &D { &self.directory }

  pub fn tracks_guild(&self, guild_id: u64) -> bool {
    self.guilds.is_empty() || self.guilds.contains(&guild_id)
  }

  fn require_tracked(&self, guild_id: u64) -> Result<(), ApiError> {
    if self.tracks_guild(guild_id) {
      Ok(())
    } else {
      Err(ApiError::NotFound(format!("guild {guild_id} is not tracked")))
    }
  }

  /// Log `change` unless it is ignorable. Returns whether a record was
  /// written.
  ///
  /// The platform also reports activity updates as presence events; those
  /// arrive with equal statuses on both sides and are dropped here.
  pub async fn record_change(&self, change: PresenceChange) -> Result<bool, ApiError> {
    if !self.tracks_guild(change.guild_id) {
      tracing::debug!(guild_id = change.guild_id, "ignoring change in untracked guild");
      return Ok(false);
    }
    if change.before == change.after {
      tracing::debug!(
        user_id = change.user_id,
        guild_id = change.guild_id,
        "ignoring presence update without a status change"
      );
      return Ok(false);
    }

    let record = TransitionRecord::change(
      Scope::new(change.user_id, change.guild_id),
      change.before,
      change.after,
      change.occurred_at,
    );
    let kind = record.kind();
    self.store.append(record).await.map_err(ApiError::store)?;
    tracing::debug!(
      user_id = change.user_id,
      guild_id = change.guild_id,
      ?kind,
      "recorded transition"
    );
    Ok(true)
  }

  /// Record startup boundaries for every member of `guild_id`.
  pub async fn start_session(
    &self,
    guild_id: u64,
    at: DateTime<Utc>,
  ) -> Result<BoundarySummary, ApiError> {
    self.boundary(guild_id, Boundary::SessionStart, at).await
  }

  /// Record shutdown boundaries for every member of `guild_id`.
  pub async fn end_session(
    &self,
    guild_id: u64,
    at: DateTime<Utc>,
  ) -> Result<BoundarySummary, ApiError> {
    self.boundary(guild_id, Boundary::SessionEnd, at).await
  }

  async fn boundary(
    &self,
    guild_id: u64,
    kind: Boundary,
    at: DateTime<Utc>,
  ) -> Result<BoundarySummary, ApiError> {
    self.require_tracked(guild_id)?;

    let batch = boundary::generate(&self.directory, guild_id, kind, at)
      .await
      .map_err(|e| ApiError::NotFound(e.to_string()))?;

    for failure in &batch.failures {
      tracing::warn!(
        guild_id,
        member_id = failure.member_id,
        error = %failure.error,
        "skipping member without a live status"
      );
    }

    let summary = BoundarySummary {
      recorded: batch.records.len(),
      skipped:  batch.failures.len(),
    };
    self
      .store
      .append_batch(batch.records)
      .await
      .map_err(ApiError::store)?;

    tracing::info!(
      guild_id,
      boundary = ?kind,
      recorded = summary.recorded,
      skipped = summary.skipped,
      "recorded session boundary"
    );
    Ok(summary)
  }

  /// Stats for `scope` up to `now`.
  ///
  /// Takes an early log first so the interval the user is currently in
  /// counts up to `now`.
  pub async fn report(
    &self,
    scope: Scope,
    now: DateTime<Utc>,
  ) -> Result<StatusReport, ApiError> {
    self.require_tracked(scope.guild_id)?;

    match boundary::snapshot(&self.directory, scope, now).await {
      Ok(record) => self.store.append(record).await.map_err(ApiError::store)?,
      Err(error) => tracing::warn!(
        user_id = scope.user_id,
        guild_id = scope.guild_id,
        %error,
        "no live status for early log"
      ),
    }

    let records = self
      .store
      .query_ordered(scope)
      .await
      .map_err(ApiError::store)?;
    let intervals = reconstruct(&records).map_err(ApiError::Integrity)?;
    let totals = aggregate(&intervals);

    let proportions = match totals.to_proportions() {
      Ok(proportions) => Some(proportions),
      Err(observer_core::Error::NoData) => None,
      Err(other) => return Err(ApiError::Integrity(other)),
    };

    let durations: BTreeMap<_, _> =
      totals.iter().map(|(s, d)| (s, d.num_seconds())).collect();
    Ok(StatusReport {
      user_id: scope.user_id,
      guild_id: scope.guild_id,
      generated_at: now,
      total: durations.values().sum(),
      durations,
      proportions,
    })
  }

  /// The stats of `scope` as an SVG chart, or `None` when there is nothing
  /// to show.
  pub async fn chart(
    &self,
    scope: Scope,
    now: DateTime<Utc>,
  ) -> Result<Option<String>, ApiError> {
    let report = self.report(scope, now).await?;
    report
      .proportions
      .map(|shares| observer_chart::render_status_chart(&shares))
      .transpose()
      .map_err(ApiError::from)
  }
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, sync::Mutex};

  use chrono::{TimeDelta, TimeZone as _};
  use observer_core::status::StatusMark;

  use super::*;
  use crate::presence::PresenceCache;

  /// Keeps records in a vector; returns them sorted unless `unsorted`.
  #[derive(Default)]
  struct MemoryStore {
    records:  Mutex<Vec<TransitionRecord>>,
    unsorted: bool,
  }

  impl MemoryStore {
    fn all(&self) -> Vec<TransitionRecord> { self.records.lock().unwrap().clone() }
  }

  impl EventStore for MemoryStore {
    type Error = Infallible;

    async fn append(&self, record: TransitionRecord) -> Result<(), Infallible> {
      self.records.lock().unwrap().push(record);
      Ok(())
    }

    async fn append_batch(&self, records: Vec<TransitionRecord>) -> Result<(), Infallible> {
      self.records.lock().unwrap().extend(records);
      Ok(())
    }

    async fn query_ordered(&self, scope: Scope) -> Result<Vec<TransitionRecord>, Infallible> {
      let mut records: Vec<_> =
        self.all().into_iter().filter(|r| r.scope() == scope).collect();
      if !self.unsorted {
        records.sort_by_key(|r| r.timestamp);
      }
      Ok(records)
    }
  }

  const GUILD: u64 = 10;

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap() }

  fn mins(m: i64) -> TimeDelta { TimeDelta::minutes(m) }

  fn tracker(guilds: &[u64]) -> StatusTracker<MemoryStore, PresenceCache> {
    StatusTracker::new(MemoryStore::default(), PresenceCache::new(), guilds.iter().copied())
  }

  fn change(user_id: u64, before: Status, after: Status, at: DateTime<Utc>) -> PresenceChange {
    PresenceChange { user_id, guild_id: GUILD, before, after, occurred_at: at }
  }

  #[tokio::test]
  async fn ignores_equal_statuses_and_untracked_guilds() {
    let t = tracker(&[GUILD]);
    assert!(
      !t.record_change(change(1, Status::Idle, Status::Idle, t0()))
        .await
        .unwrap()
    );

    let elsewhere = PresenceChange {
      guild_id: 11,
      ..change(1, Status::Idle, Status::Online, t0())
    };
    assert!(!t.record_change(elsewhere).await.unwrap());
    assert!(t.store().all().is_empty());

    assert!(
      t.record_change(change(1, Status::Idle, Status::Online, t0()))
        .await
        .unwrap()
    );
    assert_eq!(t.store().all().len(), 1);
  }

  #[tokio::test]
  async fn empty_allow_list_tracks_everything() {
    let t = tracker(&[]);
    assert!(t.tracks_guild(1) && t.tracks_guild(u64::MAX));
    assert!(!tracker(&[GUILD]).tracks_guild(1));
  }

  #[tokio::test]
  async fn session_boundaries_cover_cached_members() {
    let t = tracker(&[]);
    t.directory()
      .replace_guild(GUILD, [(1, Status::Online), (2, Status::Dnd)])
      .await;

    let summary = t.start_session(GUILD, t0()).await.unwrap();
    assert_eq!(summary, BoundarySummary { recorded: 2, skipped: 0 });

    let summary = t.end_session(GUILD, t0() + mins(5)).await.unwrap();
    assert_eq!(summary.recorded, 2);

    let records = t.store().all();
    assert!(records[..2].iter().all(|r| r.before == StatusMark::Unknown));
    assert!(records[2..].iter().all(|r| r.after == StatusMark::Unknown));
  }

  #[tokio::test]
  async fn boundary_for_unannounced_guild_is_not_found() {
    let t = tracker(&[]);
    let err = t.start_session(GUILD, t0()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let t = tracker(&[1]);
    assert!(matches!(
      t.end_session(GUILD, t0()).await,
      Err(ApiError::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn report_extends_the_open_interval_to_now() {
    let t = tracker(&[]);
    t.directory().replace_guild(GUILD, [(1, Status::Online)]).await;
    t.start_session(GUILD, t0()).await.unwrap();
    t.record_change(change(1, Status::Online, Status::Idle, t0() + mins(15)))
      .await
      .unwrap();
    t.directory().update(GUILD, 1, Status::Idle).await;

    let report = t.report(Scope::new(1, GUILD), t0() + mins(25)).await.unwrap();
    assert_eq!(report.durations.get(&Status::Online), Some(&(15 * 60)));
    assert_eq!(report.durations.get(&Status::Idle), Some(&(10 * 60)));
    assert_eq!(report.total, 25 * 60);

    let shares = report.proportions.unwrap();
    assert!((shares.get(Status::Online) - 0.6).abs() < 1e-9);
    assert!((shares.get(Status::Idle) - 0.4).abs() < 1e-9);
  }

  #[tokio::test]
  async fn report_total_is_the_sum_of_reported_durations() {
    let t = tracker(&[]);
    let half = TimeDelta::milliseconds(1500);
    t.record_change(change(1, Status::Idle, Status::Online, t0()))
      .await
      .unwrap();
    t.record_change(change(1, Status::Online, Status::Idle, t0() + half))
      .await
      .unwrap();
    t.record_change(change(1, Status::Idle, Status::Dnd, t0() + half * 2))
      .await
      .unwrap();

    let report = t.report(Scope::new(1, GUILD), t0() + mins(1)).await.unwrap();
    assert_eq!(report.durations.get(&Status::Online), Some(&1));
    assert_eq!(report.durations.get(&Status::Idle), Some(&1));
    assert_eq!(report.total, report.durations.values().sum::<i64>());
    assert_eq!(report.total, 2);
  }

  #[tokio::test]
  async fn report_without_history_has_no_proportions() {
    let t = tracker(&[]);
    // No cached status either: the early log is skipped.
    let report = t.report(Scope::new(1, GUILD), t0()).await.unwrap();
    assert!(report.durations.is_empty());
    assert_eq!(report.proportions, None);
    assert!(t.store().all().is_empty());

    assert_eq!(t.chart(Scope::new(1, GUILD), t0()).await.unwrap(), None);
  }

  #[tokio::test]
  async fn chart_renders_when_there_is_data() {
    let t = tracker(&[]);
    t.directory().replace_guild(GUILD, [(1, Status::Dnd)]).await;
    t.start_session(GUILD, t0()).await.unwrap();

    let svg = t
      .chart(Scope::new(1, GUILD), t0() + mins(1))
      .await
      .unwrap()
      .unwrap();
    assert!(svg.contains(observer_chart::status_color(Status::Dnd)));
  }

  #[tokio::test]
  async fn out_of_order_history_is_an_integrity_error() {
    let t = StatusTracker::new(
      MemoryStore { unsorted: true, ..Default::default() },
      PresenceCache::new(),
      [],
    );
    t.record_change(change(1, Status::Idle, Status::Online, t0() + mins(5)))
      .await
      .unwrap();
    t.record_change(change(1, Status::Online, Status::Dnd, t0()))
      .await
      .unwrap();

    let err = t.report(Scope::new(1, GUILD), t0() + mins(9)).await.unwrap_err();
    assert!(matches!(err, ApiError::Integrity(e) if e.is_data_integrity()));
  }

  #[tokio::test]
  async fn requests_for_untracked_guilds_are_not_found() {
    let t = tracker(&[GUILD]);
    assert!(matches!(
      t.report(Scope::new(1, 99), t0()).await,
      Err(ApiError::NotFound(_))
    ));
  }
}
