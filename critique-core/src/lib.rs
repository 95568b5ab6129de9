//! Persistence, auth primitives, and bulk ingestion for the critique
//! review platform.
//!
//! The HTTP layer lives in `critique-server`; everything here is reachable
//! without a running server, which is what the `critiquectl` CLI and the
//! integration tests rely on.
#![allow(missing_docs)]

pub mod auth;
pub mod database;
pub mod error;
pub mod ingest;

pub use database::{Database, Page, Repositories};
pub use error::{CoreError, Result};

/// Embedded schema migrations, applied on startup and by `sqlx::test`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
