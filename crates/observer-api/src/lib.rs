//! Request layer for Observer.
//!
//! Exposes the [`StatusTracker`], the [`PresenceCache`] it reads live
//! statuses from, and an axum [`Router`] over both. Transport concerns
//! (binding, tracing layers, shutdown) are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/presence` | 202 when recorded, 204 when ignored |
//! | `POST` | `/guilds/{guild_id}/ready` | Body: `[{"user_id":1,"status":"online"}]` |
//! | `GET`  | `/guilds/{guild_id}/users/{user_id}/stats` | JSON [`StatusReport`] |
//! | `GET`  | `/guilds/{guild_id}/users/{user_id}/chart` | SVG, 204 with no data |

pub mod error;
pub mod events;
pub mod presence;
pub mod stats;
pub mod tracker;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use observer_core::store::EventStore;

pub use error::ApiError;
pub use presence::{LookupError, PresenceCache};
pub use tracker::{BoundarySummary, PresenceChange, StatusReport, StatusTracker};

/// The tracker as served over HTTP: live statuses come from the relay-fed
/// cache.
pub type Tracker<S> = StatusTracker<S, PresenceCache>;

/// Build a fully-materialised router for `tracker`.
pub fn router<S>(tracker: Arc<Tracker<S>>) -> Router<()>
where
  S: EventStore + 'static,
{
  Router::new()
    .route("/presence", post(events::presence::<S>))
    .route("/guilds/{guild_id}/ready", post(events::ready::<S>))
    .route("/guilds/{guild_id}/users/{user_id}/stats", get(stats::report::<S>))
    .route("/guilds/{guild_id}/users/{user_id}/chart", get(stats::chart::<S>))
    .with_state(tracker)
}
