//! IO modules - journey store collaborators
//!
//! This module contains all persistence access:
//! - `store` - Read-only `JourneyStore` interface and `StoreError`
//! - `sqlite_store` - SQLite-backed store (bundled rusqlite)
//! - `memory_store` - In-process store with a query counter

pub mod memory_store;
pub mod sqlite_store;
pub mod store;

// Re-export commonly used types
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use store::{JourneyStore, StoreError};
