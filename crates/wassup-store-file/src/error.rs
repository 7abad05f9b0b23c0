//! Error type for `wassup-store-file`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot write {}: {source}", path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("corrupt database in {}: {source}", path.display())]
  Corrupt {
    path:   PathBuf,
    #[source]
    source: wassup_core::Error,
  },

  #[error("core error: {0}")]
  Core(#[from] wassup_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
