//! Immutable views of the store handed to consumers

use super::{Book, UserScope};
use std::sync::Arc;

/// Where the store is in its scope lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScopePhase {
    /// No active user; collections are empty and nothing is persisted
    #[default]
    Unscoped,

    /// Collections for this scope are being read from the backend
    Loading(UserScope),

    /// Collections reflect this scope
    Ready(UserScope),
}

impl ScopePhase {
    /// The scope being loaded or ready, if any
    pub fn scope(&self) -> Option<&UserScope> {
        match self {
            ScopePhase::Unscoped => None,
            ScopePhase::Loading(scope) | ScopePhase::Ready(scope) => Some(scope),
        }
    }

    /// Whether a load is still in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, ScopePhase::Loading(_))
    }
}

/// Point-in-time copy of both collections.
///
/// Library and favorites in one snapshot always belong to the same scope.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Lifecycle phase the collections were taken in
    pub phase: ScopePhase,

    /// Newest first
    pub library: Arc<[Book]>,

    /// In favoriting order
    pub favorites: Arc<[Book]>,
}

impl Snapshot {
    /// Empty collections with no active user
    pub fn unscoped() -> Self {
        Self {
            phase: ScopePhase::Unscoped,
            library: Arc::from(Vec::new()),
            favorites: Arc::from(Vec::new()),
        }
    }

    /// Whether a book with this id is a favorite
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|book| book.id == id)
    }

    /// Look up a library book by id
    pub fn find_book(&self, id: &str) -> Option<&Book> {
        self.library.iter().find(|book| book.id == id)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::unscoped()
    }
}
