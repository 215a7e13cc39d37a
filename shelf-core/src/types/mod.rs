//! Core types shared by the store and its consumers

mod book;
mod scope;
mod snapshot;

pub use book::Book;
pub use scope::UserScope;
pub use snapshot::{ScopePhase, Snapshot};
