//! The on-disk document shape and its conversion to and from
//! [`TransitionRecord`].
//!
//! Documents are kept separate from the domain type so the file format only
//! changes when this module does. Unknown sides are `null`.

use chrono::{DateTime, Utc};
use observer_core::{record::TransitionRecord, status::Status};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusDocument {
  pub user_id:   u64,
  pub guild_id:  u64,
  pub before:    Option<Status>,
  pub after:     Option<Status>,
  pub timestamp: DateTime<Utc>,
}

impl From<&TransitionRecord> for StatusDocument {
  fn from(record: &TransitionRecord) -> Self {
    Self {
      user_id:   record.user_id,
      guild_id:  record.guild_id,
      before:    record.before.known(),
      after:     record.after.known(),
      timestamp: record.timestamp,
    }
  }
}

impl StatusDocument {
  pub fn into_record(self) -> Result<TransitionRecord> {
    let record = TransitionRecord {
      user_id:   self.user_id,
      guild_id:  self.guild_id,
      before:    self.before.into(),
      after:     self.after.into(),
      timestamp: self.timestamp,
    };
    record.validate()?;
    Ok(record)
  }
}

/// Validate `record` and append its document, newline-terminated, to `buf`.
pub fn encode_into(buf: &mut String, record: &TransitionRecord) -> Result<()> {
  record.validate()?;
  buf.push_str(&serde_json::to_string(&StatusDocument::from(record))?);
  buf.push('\n');
  Ok(())
}

/// Decode the document on `line` (1-based, for error messages).
pub fn decode(text: &str, line: usize) -> Result<TransitionRecord> {
  serde_json::from_str::<StatusDocument>(text)
    .map_err(|source| Error::Corrupt { line, source })?
    .into_record()
}
