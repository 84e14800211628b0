//! [`SqliteStore`]: the SQLite implementation of [`EventStore`].

use std::{path::Path, time::Duration};

use observer_core::{
  record::{Scope, TransitionRecord},
  store::EventStore,
};

use crate::{
  Result,
  encode::{EncodedRecord, RawRecord, encode_id},
  schema::{SCHEMA, SCHEMA_VERSION},
};

const INSERT: &str = "INSERT INTO status_log (user_id, guild_id, before, after, time)
                      VALUES (?1, ?2, ?3, ?4, ?5)";

/// Default time a write waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Observer transition log backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT).await
  }

  /// Like [`SqliteStore::open`], waiting at most `busy_timeout` on a locked
  /// database before an operation fails.
  pub async fn open_with_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init(busy_timeout).await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init(DEFAULT_BUSY_TIMEOUT).await?;
    Ok(store)
  }

  async fn init(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        let version: i64 =
          conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
          conn.execute_batch(SCHEMA)?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = crate::Error;

  async fn append(&self, record: TransitionRecord) -> Result<()> {
    let row = EncodedRecord::new(&record)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          INSERT,
          rusqlite::params![row.user_id, row.guild_id, row.before, row.after, row.time],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn append_batch(&self, records: Vec<TransitionRecord>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    // Encode everything up front so an invalid record rejects the whole batch
    // before anything reaches the database.
    let rows = records
      .iter()
      .map(EncodedRecord::new)
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare_cached(INSERT)?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.user_id,
              row.guild_id,
              row.before,
              row.after,
              row.time,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_ordered(&self, scope: Scope) -> Result<Vec<TransitionRecord>> {
    let user_id = encode_id(scope.user_id);
    let guild_id = encode_id(scope.guild_id);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT user_id, guild_id, before, after, time
           FROM status_log
           WHERE user_id = ?1 AND guild_id = ?2
           ORDER BY time, seq",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![user_id, guild_id], |row| {
            Ok(RawRecord {
              user_id:  row.get(0)?,
              guild_id: row.get(1)?,
              before:   row.get(2)?,
              after:    row.get(3)?,
              time:     row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}
