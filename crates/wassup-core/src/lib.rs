//! Core types and trait definitions for the Wassup backend.
//!
//! This crate is deliberately free of HTTP and file-system dependencies.
//! It holds the domain model (users, friends, sups), the wire protocol
//! envelopes, and the [`store::SupStore`] abstraction the other crates build
//! on.

pub mod database;
pub mod error;
pub mod protocol;
pub mod store;
pub mod user;

pub use database::Database;
pub use error::{Error, Result};
pub use user::{Sup, User, UserId};
