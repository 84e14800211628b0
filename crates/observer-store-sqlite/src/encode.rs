//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC strings with microsecond precision and a `Z`
//! suffix. Every value has the same width, so text order in `ORDER BY time`
//! is chronological order. Platform ids are unsigned 64-bit; SQLite integers
//! are signed, so ids are stored bit-for-bit as `i64`.

use chrono::{DateTime, SecondsFormat, Utc};
use observer_core::{
  record::TransitionRecord,
  status::{Status, StatusMark},
};

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: u64) -> i64 { id as i64 }

pub fn decode_id(raw: i64) -> u64 { raw as u64 }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── StatusMark ──────────────────────────────────────────────────────────────

pub fn encode_mark(mark: StatusMark) -> Option<&'static str> {
  mark.known().map(Status::as_str)
}

pub fn decode_mark(s: Option<&str>) -> Result<StatusMark> {
  Ok(s.map(str::parse::<Status>).transpose()?.into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `status_log` row.
pub struct RawRecord {
  pub user_id:  i64,
  pub guild_id: i64,
  pub before:   Option<String>,
  pub after:    Option<String>,
  pub time:     String,
}

impl RawRecord {
  pub fn into_record(self) -> Result<TransitionRecord> {
    let record = TransitionRecord {
      user_id:   decode_id(self.user_id),
      guild_id:  decode_id(self.guild_id),
      before:    decode_mark(self.before.as_deref())?,
      after:     decode_mark(self.after.as_deref())?,
      timestamp: decode_dt(&self.time)?,
    };
    record.validate()?;
    Ok(record)
  }
}

/// Column values for one `INSERT` into `status_log`.
pub struct EncodedRecord {
  pub user_id:  i64,
  pub guild_id: i64,
  pub before:   Option<&'static str>,
  pub after:    Option<&'static str>,
  pub time:     String,
}

impl EncodedRecord {
  /// Validate `record` and encode its columns.
  pub fn new(record: &TransitionRecord) -> Result<Self> {
    record.validate()?;
    Ok(Self {
      user_id:  encode_id(record.user_id),
      guild_id: encode_id(record.guild_id),
      before:   encode_mark(record.before),
      after:    encode_mark(record.after),
      time:     encode_dt(record.timestamp),
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sort_chronologically() {
    let whole = Utc.with_ymd_and_hms(2023, 1, 1, 4, 2, 0).unwrap();
    let fractional = whole + chrono::TimeDelta::milliseconds(500);

    let a = encode_dt(whole);
    let b = encode_dt(fractional);
    assert_eq!(a, "2023-01-01T04:02:00.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), fractional);
  }

  #[test]
  fn ids_survive_the_signed_column() {
    let snowflake = u64::MAX - 41;
    assert_eq!(decode_id(encode_id(snowflake)), snowflake);
  }

  #[test]
  fn unknown_status_text_is_corruption() {
    let err = decode_mark(Some("invisible")).unwrap_err();
    assert!(matches!(
      err,
      Error::Core(observer_core::Error::UnknownStatus(_))
    ));
    assert_eq!(decode_mark(None).unwrap(), StatusMark::Unknown);
  }
}
