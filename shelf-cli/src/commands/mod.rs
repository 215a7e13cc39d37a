//! CLI command implementations

mod add;
mod favorite;
mod list;
mod remove;

pub use add::{add, BookDraft};
pub use favorite::favorite;
pub use list::{favorites, list};
pub use remove::remove;

use anyhow::{Context, Result};
use shelf_core::{CollectionStore, ShelfConfig};
use std::sync::Arc;

/// Open the file-backed store for the configured user and wait for their
/// collections to load
pub(crate) async fn open_session(config: &ShelfConfig) -> Result<CollectionStore> {
    let scope = config
        .scope()
        .context("No active user: pass --user or set SHELF_USER")?;

    tracing::debug!(
        "Opening collections for {} in {}",
        scope,
        config.data_dir.display()
    );

    let store = CollectionStore::new(Arc::new(config.file_store()));
    store.set_active_user(Some(scope));
    store.ready().await;
    Ok(store)
}
