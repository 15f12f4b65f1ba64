//! # Marquee Persistence
//!
//! SQLite storage for job records and the movie catalog.
//!
//! The in-memory stores in `marquee-queue` and `marquee-catalog` cover tests;
//! this crate is the durable single-node deployment path.

pub mod catalog;
pub mod queue;
pub mod sqlite;

pub use catalog::SqliteCatalog;
pub use queue::SqliteJobStore;
pub use sqlite::{Database, PersistError, SqliteConfig};
