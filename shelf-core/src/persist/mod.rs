//! Persistence adapter between the collection store and a key-value backend
//!
//! Collections are stored as JSON arrays of [`Book`] records under keys
//! namespaced by the user scope. Reads are permissive: an absent record, a
//! malformed payload and a failing backend all load as an empty collection.

mod queue;

pub use queue::PersistQueue;

use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::types::{Book, UserScope};

/// Key prefix for library records
pub const LIBRARY_PREFIX: &str = "library:";

/// Key prefix for favorites records
pub const FAVORITES_PREFIX: &str = "favorites:";

/// Backend key holding the library of `scope`
pub fn library_key(scope: &UserScope) -> String {
    format!("{}{}", LIBRARY_PREFIX, scope.as_str())
}

/// Backend key holding the favorites of `scope`
pub fn favorites_key(scope: &UserScope) -> String {
    format!("{}{}", FAVORITES_PREFIX, scope.as_str())
}

/// Serialize a collection to its stored form
pub fn encode(books: &[Book]) -> Result<String> {
    Ok(serde_json::to_string(books)?)
}

/// Parse a stored collection. Anything that is not a JSON array of book
/// objects yields an empty collection.
pub fn decode(payload: &str) -> Vec<Book> {
    match serde_json::from_str(payload) {
        Ok(books) => books,
        Err(e) => {
            tracing::warn!("Discarding malformed collection payload: {}", e);
            Vec::new()
        }
    }
}

/// Load the collection stored under `key`, never failing
pub async fn load_collection(backend: &dyn KeyValueStore, key: &str) -> Vec<Book> {
    match backend.get(key).await {
        Ok(Some(payload)) => decode(&payload),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to load {}, starting empty: {}", key, e);
            Vec::new()
        }
    }
}
