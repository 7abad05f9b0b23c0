//! [`FileStore`]: the single-file implementation of [`SupStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use wassup_core::{Database, store::SupStore};

use crate::{Error, Result};

/// File name used when no store path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "wassup_app_db.json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Wassup store backed by a single file.
///
/// Saving overwrites the file in place; a crash mid-write can leave it
/// truncated. Concurrent load/save cycles are not serialised here.
#[derive(Debug, Clone)]
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  /// A store at `path`. Nothing is touched on disk until the first save.
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf() }
  }

  pub fn path(&self) -> &Path { &self.path }
}

// ─── SupStore impl ───────────────────────────────────────────────────────────

impl SupStore for FileStore {
  type Error = Error;

  async fn load(&self) -> Result<Database> {
    let bytes = match tokio::fs::read(&self.path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        tracing::debug!(path = %self.path.display(), "no store file yet, starting empty");
        return Ok(Database::new());
      }
      Err(source) => {
        return Err(Error::Read { path: self.path.clone(), source });
      }
    };

    Database::from_slice(&bytes).map_err(|source| Error::Corrupt {
      path: self.path.clone(),
      source,
    })
  }

  async fn save(&self, db: &Database) -> Result<()> {
    let bytes = db.to_vec()?;
    tokio::fs::write(&self.path, bytes)
      .await
      .map_err(|source| Error::Write { path: self.path.clone(), source })?;
    tracing::debug!(path = %self.path.display(), users = db.len(), "saved store");
    Ok(())
  }
}
