//! [`DocumentStore`]: the JSON-lines implementation of [`EventStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use observer_core::{
  record::{Scope, TransitionRecord},
  store::EventStore,
};
use tokio::{
  fs::{File, OpenOptions},
  io::AsyncWriteExt as _,
  sync::Mutex,
};

use crate::{
  Result,
  document::{decode, encode_into},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Observer transition log kept as one JSON document per line.
///
/// All writes and reads go through one FIFO lock, so writes land in the order
/// they were submitted and a reader never sees half a line. A write either
/// lands whole or is cut back off the file. Cloning is cheap.
#[derive(Clone)]
pub struct DocumentStore {
  inner: Arc<Inner>,
}

struct Inner {
  path: PathBuf,
  log:  Mutex<Log>,
}

struct Log {
  file:      File,
  /// Length of the file up to the end of the last fully written document.
  committed: u64,
}

impl DocumentStore {
  /// Open (or create) the log at `path`.
  ///
  /// A final line without its newline is the remains of a write that never
  /// completed (and was never acknowledged); it is cut off.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .await?;

    let contents = tokio::fs::read(&path).await?;
    let committed = contents
      .iter()
      .rposition(|&b| b == b'\n')
      .map_or(0, |i| i + 1) as u64;
    if committed != contents.len() as u64 {
      file.set_len(committed).await?;
    }

    Ok(Self {
      inner: Arc::new(Inner {
        path,
        log: Mutex::new(Log { file, committed }),
      }),
    })
  }

  pub fn path(&self) -> &Path { &self.inner.path }

  /// Append `buf` as one unit. A failed write is cut back off the file, and
  /// anything past the committed length is cut before the next write.
  async fn write(&self, buf: String) -> Result<()> {
    let mut log = self.inner.log.lock().await;

    if log.file.metadata().await?.len() != log.committed {
      log.file.set_len(log.committed).await?;
    }

    match write_synced(&mut log.file, buf.as_bytes()).await {
      Ok(()) => {
        log.committed += buf.len() as u64;
        Ok(())
      }
      Err(error) => {
        // Retried before the next write if this fails too.
        let _ = log.file.set_len(log.committed).await;
        Err(error.into())
      }
    }
  }
}

async fn write_synced(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
  file.write_all(bytes).await?;
  file.flush().await?;
  file.sync_data().await
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for DocumentStore {
  type Error = crate::Error;

  async fn append(&self, record: TransitionRecord) -> Result<()> {
    let mut buf = String::new();
    encode_into(&mut buf, &record)?;
    self.write(buf).await
  }

  /// Every document is encoded before anything is written, and the batch goes
  /// out in a single write.
  async fn append_batch(&self, records: Vec<TransitionRecord>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    let mut buf = String::new();
    for record in &records {
      encode_into(&mut buf, record)?;
    }
    self.write(buf).await
  }

  async fn query_ordered(&self, scope: Scope) -> Result<Vec<TransitionRecord>> {
    let (contents, committed) = {
      let log = self.inner.log.lock().await;
      let contents = tokio::fs::read_to_string(&self.inner.path).await?;
      (contents, log.committed as usize)
    };
    // Bytes past the committed end belong to a write that failed.
    let committed = contents.get(..committed).unwrap_or(&contents);

    let mut records = Vec::new();
    for (i, line) in committed.lines().enumerate() {
      if line.trim().is_empty() {
        continue;
      }
      let record = decode(line, i + 1)?;
      if record.scope() == scope {
        records.push(record);
      }
    }

    // Stable: records sharing a timestamp keep their file order.
    records.sort_by_key(|record| record.timestamp);
    Ok(records)
  }
}
