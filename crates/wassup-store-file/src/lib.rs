//! Single-file backend for the Wassup store.
//!
//! The whole database lives in one file that is read in full on every load
//! and overwritten in full on every save.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_DB_FILE_NAME, FileStore};

#[cfg(test)]
mod tests;
