//! Mutations on a pair of collections

use crate::types::Book;

/// A change requested by a consumer
#[derive(Debug, Clone)]
pub(crate) enum Mutation {
    /// Prepend to the library
    Add(Book),

    /// Add to or remove from favorites by id
    Toggle(Book),

    /// Remove from the library and favorites by id
    Remove(String),
}

/// Which collections a mutation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Touched {
    pub library: bool,
    pub favorites: bool,
}

impl Touched {
    pub fn any(self) -> bool {
        self.library || self.favorites
    }
}

impl std::ops::BitOrAssign for Touched {
    fn bitor_assign(&mut self, rhs: Self) {
        self.library |= rhs.library;
        self.favorites |= rhs.favorites;
    }
}

/// Library (newest first) and favorites (favoriting order) of one scope
#[derive(Debug, Clone, Default)]
pub(crate) struct Collections {
    pub library: Vec<Book>,
    pub favorites: Vec<Book>,
}

impl Collections {
    pub fn apply(&mut self, mutation: &Mutation) -> Touched {
        match mutation {
            Mutation::Add(book) => {
                self.library.insert(0, book.clone());
                Touched {
                    library: true,
                    favorites: false,
                }
            }
            Mutation::Toggle(book) => {
                if let Some(pos) = self.favorites.iter().position(|fav| fav.id == book.id) {
                    self.favorites.remove(pos);
                } else {
                    self.favorites.push(book.clone());
                }
                Touched {
                    library: false,
                    favorites: true,
                }
            }
            Mutation::Remove(id) => {
                let library_len = self.library.len();
                let favorites_len = self.favorites.len();
                self.library.retain(|book| &book.id != id);
                self.favorites.retain(|book| &book.id != id);
                Touched {
                    library: self.library.len() != library_len,
                    favorites: self.favorites.len() != favorites_len,
                }
            }
        }
    }
}
