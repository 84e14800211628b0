//! Handlers for the user-facing stats endpoints.
//!
//! Both take an early log of the target user's live status before reading
//! the history.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use observer_core::{record::Scope, store::EventStore};

use crate::{Tracker, error::ApiError, tracker::StatusReport};

/// `GET /guilds/:guild_id/users/:user_id/stats`
pub async fn report<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path((guild_id, user_id)): Path<(u64, u64)>,
) -> Result<Json<StatusReport>, ApiError>
where
  S: EventStore,
{
  let report = tracker.report(Scope::new(user_id, guild_id), Utc::now()).await?;
  Ok(Json(report))
}

/// `GET /guilds/:guild_id/users/:user_id/chart`: 204 when there is nothing
/// to show.
pub async fn chart<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path((guild_id, user_id)): Path<(u64, u64)>,
) -> Result<Response, ApiError>
where
  S: EventStore,
{
  let chart = tracker.chart(Scope::new(user_id, guild_id), Utc::now()).await?;
  Ok(match chart {
    Some(svg) => ([(header::CONTENT_TYPE, observer_chart::CONTENT_TYPE)], svg).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  })
}
