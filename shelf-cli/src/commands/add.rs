//! Add command implementation

use super::open_session;
use anyhow::Result;
use shelf_core::{Book, ShelfConfig};

/// Fields supplied on the command line; unset ones keep the draft defaults
pub struct BookDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub cover: String,
    pub summary: String,
}

impl BookDraft {
    fn into_book(self) -> Book {
        let mut book = Book::from_cover(self.cover, self.summary);
        if let Some(id) = self.id {
            book.id = id;
        }
        if let Some(title) = self.title {
            book = book.with_title(title);
        }
        if let Some(author) = self.author {
            book = book.with_author(author);
        }
        if let Some(year) = self.year {
            book = book.with_year(year);
        }
        book
    }
}

/// Add a book to the active user's library
pub async fn add(config: &ShelfConfig, draft: BookDraft) -> Result<()> {
    let store = open_session(config).await?;

    let book = draft.into_book();
    let (id, title) = (book.id.clone(), book.title.clone());
    store.add_book(book);
    store.dispose().await;

    println!("Added \"{}\" with id {}", title, id);
    Ok(())
}
