//! Shelf Core Library
//!
//! This crate provides the user-scoped collection store behind the Shelf
//! book scanner. Each signed-in user has a library (every book they added,
//! newest first) and a favorites subset. Both are held in memory, persisted
//! to a key-value backend on every change, and re-scoped whenever the active
//! user changes.

pub mod config;
pub mod error;
pub mod persist;
pub mod storage;
pub mod store;
pub mod types;

pub use config::ShelfConfig;
pub use error::{Result, ShelfError, StorageError};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::CollectionStore;
pub use types::{Book, ScopePhase, Snapshot, UserScope};
