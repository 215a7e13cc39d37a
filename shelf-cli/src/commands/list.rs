//! List and favorites command implementations

use super::open_session;
use anyhow::Result;
use shelf_core::{Book, ShelfConfig};

/// Display the active user's library, newest first
pub async fn list(config: &ShelfConfig, json: bool) -> Result<()> {
    let store = open_session(config).await?;
    let snapshot = store.snapshot();

    print_books(&snapshot.library, json, "No books in library", |book| {
        snapshot.is_favorite(&book.id)
    })
}

/// Display the active user's favorites
pub async fn favorites(config: &ShelfConfig, json: bool) -> Result<()> {
    let store = open_session(config).await?;
    let snapshot = store.snapshot();

    print_books(&snapshot.favorites, json, "No favorites yet", |_| false)
}

fn print_books(
    books: &[Book],
    json: bool,
    empty_message: &str,
    marked: impl Fn(&Book) -> bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(books)?);
        return Ok(());
    }

    if books.is_empty() {
        println!("{}", empty_message);
        return Ok(());
    }

    for book in books {
        let marker = if marked(book) { " *" } else { "" };
        println!(
            "{:<16} {} by {} ({}){}",
            book.id, book.title, book.author, book.year, marker
        );
    }
    Ok(())
}
