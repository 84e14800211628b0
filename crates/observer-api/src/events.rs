//! Handlers for events pushed by the relay.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/presence` | Body: `{"user_id","guild_id","before","after","occurred_at"?}` |
//! | `POST` | `/guilds/:guild_id/ready` | Body: `[{"user_id","status"}]` |
//!
//! Session starts are only recorded on `ready`. The presence cache starts
//! empty, so after a restart no startup boundary is written and every early
//! log is skipped until the relay sends `ready` for the guild again.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
};
use chrono::{DateTime, Utc};
use observer_core::{status::Status, store::EventStore};
use serde::Deserialize;

use crate::{
  Tracker,
  error::ApiError,
  tracker::{BoundarySummary, PresenceChange},
};

fn parse<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(body)| body)
    .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// ─── Presence ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PresenceBody {
  pub user_id:     u64,
  pub guild_id:    u64,
  pub before:      Status,
  pub after:       Status,
  /// Defaults to the time the event is received.
  pub occurred_at: Option<DateTime<Utc>>,
}

/// `POST /presence`
pub async fn presence<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  body: Result<Json<PresenceBody>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
  S: EventStore,
{
  let body = parse(body)?;

  if tracker.tracks_guild(body.guild_id) {
    tracker
      .directory()
      .update(body.guild_id, body.user_id, body.after)
      .await;
  }

  let recorded = tracker
    .record_change(PresenceChange {
      user_id:     body.user_id,
      guild_id:    body.guild_id,
      before:      body.before,
      after:       body.after,
      occurred_at: body.occurred_at.unwrap_or_else(Utc::now),
    })
    .await?;

  Ok(if recorded {
    StatusCode::ACCEPTED
  } else {
    StatusCode::NO_CONTENT
  })
}

// ─── Ready ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MemberStatus {
  pub user_id: u64,
  pub status:  Status,
}

/// `POST /guilds/:guild_id/ready`: the relay has (re)connected and sends the
/// guild's full member list.
pub async fn ready<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(guild_id): Path<u64>,
  body: Result<Json<Vec<MemberStatus>>, JsonRejection>,
) -> Result<Json<BoundarySummary>, ApiError>
where
  S: EventStore,
{
  let members = parse(body)?;
  if !tracker.tracks_guild(guild_id) {
    return Err(ApiError::NotFound(format!("guild {guild_id} is not tracked")));
  }

  tracker
    .directory()
    .replace_guild(guild_id, members.into_iter().map(|m| (m.user_id, m.status)))
    .await;

  let summary = tracker.start_session(guild_id, Utc::now()).await?;
  Ok(Json(summary))
}
