//! Error types for `observer-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A record with neither side known carries no information.
  #[error(
    "transition for user {user_id} in guild {guild_id} has neither a before \
     nor an after status"
  )]
  EmptyTransition { user_id: u64, guild_id: u64 },

  #[error("unknown status value: {0:?}")]
  UnknownStatus(String),

  #[error(
    "record {index} at {current} is earlier than its predecessor at {previous}"
  )]
  OutOfOrder {
    index:    usize,
    previous: DateTime<Utc>,
    current:  DateTime<Utc>,
  },

  #[error(
    "record {index} belongs to user {user_id} in guild {guild_id}, outside \
     the history being reconstructed"
  )]
  ScopeMismatch {
    index:    usize,
    user_id:  u64,
    guild_id: u64,
  },

  /// There are no valid intervals to show. A legitimate empty result.
  #[error("nothing to show")]
  NoData,
}

impl Error {
  /// Whether this error means the stored history itself is inconsistent.
  pub fn is_data_integrity(&self) -> bool {
    matches!(self, Self::OutOfOrder { .. } | Self::ScopeMismatch { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
