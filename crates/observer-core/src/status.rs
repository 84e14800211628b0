//! Presence statuses and the nullable status slot used on both sides of a
//! transition.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Status ──────────────────────────────────────────────────────────────────

/// A member's presence status as reported by the chat platform.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Online,
  Idle,
  Dnd,
  Offline,
}

impl Status {
  /// Every status, in chart order.
  pub const ALL: [Status; 4] =
    [Status::Online, Status::Idle, Status::Dnd, Status::Offline];

  /// The lowercase name stored in the database and sent over the wire.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Online => "online",
      Self::Idle => "idle",
      Self::Dnd => "dnd",
      Self::Offline => "offline",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "online" => Ok(Self::Online),
      "idle" => Ok(Self::Idle),
      "dnd" => Ok(Self::Dnd),
      "offline" => Ok(Self::Offline),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── StatusMark ──────────────────────────────────────────────────────────────

/// One side of a transition: either a known status or "unknown".
///
/// `Unknown` on the `before` side marks the start of an observation session;
/// on the `after` side it marks the end of one. Serialises as a nullable
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Status>", into = "Option<Status>")]
pub enum StatusMark {
  Known(Status),
  Unknown,
}

impl StatusMark {
  pub fn known(self) -> Option<Status> {
    match self {
      Self::Known(status) => Some(status),
      Self::Unknown => None,
    }
  }

  pub fn is_known(self) -> bool { matches!(self, Self::Known(_)) }
}

impl From<Status> for StatusMark {
  fn from(status: Status) -> Self { Self::Known(status) }
}

impl From<Option<Status>> for StatusMark {
  fn from(value: Option<Status>) -> Self {
    value.map_or(Self::Unknown, Self::Known)
  }
}

impl From<StatusMark> for Option<Status> {
  fn from(mark: StatusMark) -> Self { mark.known() }
}
