//! Favorite command implementation

use super::open_session;
use anyhow::{Context, Result};
use shelf_core::ShelfConfig;

/// Toggle the favorite state of a book already in the library
pub async fn favorite(config: &ShelfConfig, id: &str) -> Result<()> {
    let store = open_session(config).await?;

    let book = store
        .snapshot()
        .find_book(id)
        .cloned()
        .with_context(|| format!("No book with id {} in the library", id))?;

    let title = book.title.clone();
    store.toggle_favorite(book);
    let now_favorite = store.is_favorite(id);
    store.dispose().await;

    if now_favorite {
        println!("Added to favorites: {}", title);
    } else {
        println!("Removed from favorites: {}", title);
    }
    Ok(())
}
