//! Runtime configuration resolved from the environment

use crate::storage::FileStore;
use crate::types::UserScope;
use std::path::PathBuf;

/// Environment variable naming the data directory
pub const DATA_DIR_VAR: &str = "SHELF_DATA_DIR";

/// Environment variable naming the active user
pub const USER_VAR: &str = "SHELF_USER";

/// Data directory used when none is configured
pub const DEFAULT_DATA_DIR: &str = "./shelf_data";

/// Where collections live and who is signed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Root directory of the file-backed store
    pub data_dir: PathBuf,

    /// Identity of the active user, if any
    pub user: Option<String>,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            user: None,
        }
    }
}

impl ShelfConfig {
    /// Read `SHELF_DATA_DIR` and `SHELF_USER`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            data_dir,
            user: lookup(USER_VAR),
        }
    }

    /// Override the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Override the active user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// The configured user as a scope; blank identities count as none
    pub fn scope(&self) -> Option<UserScope> {
        UserScope::from_identity(self.user.as_deref())
    }

    /// File-backed store rooted at the data directory
    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.data_dir)
    }
}
