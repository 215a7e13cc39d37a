//! Remove command implementation

use super::open_session;
use anyhow::{bail, Result};
use shelf_core::ShelfConfig;

/// Remove a book from the library; its favorite goes with it
pub async fn remove(config: &ShelfConfig, id: &str) -> Result<()> {
    let store = open_session(config).await?;

    let removed = store.remove_book(id);
    store.dispose().await;

    if !removed {
        bail!("No book with id {} in the library", id);
    }
    println!("Removed {}", id);
    Ok(())
}
