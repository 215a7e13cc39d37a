//! The Book record kept in a user's library and favorites

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// A book as added by the capture flow.
///
/// Every field is an opaque string: the store never validates or rewrites
/// them. Missing fields in persisted data deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Book {
    /// Identifier, unique within one user's library (caller supplied)
    pub id: String,

    /// Book title
    pub title: String,

    /// Author name
    pub author: String,

    /// Publication year
    pub year: String,

    /// Cover image URI
    pub cover: String,

    /// Generated summary text
    pub summary: String,
}

impl Book {
    /// Create a book with the given id and title; other fields are empty
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Draft a book from a captured cover and its summary.
    ///
    /// The id is the current Unix time in milliseconds and the year is the
    /// current calendar year; title and author are placeholders.
    pub fn from_cover(cover: impl Into<String>, summary: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            title: "Untitled".to_string(),
            author: "Unknown".to_string(),
            year: now.year().to_string(),
            cover: cover.into(),
            summary: summary.into(),
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the year
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    /// Set the cover URI
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = cover.into();
        self
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}
