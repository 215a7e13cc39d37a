//! User scope: the identity namespace collections are loaded and saved under

use crate::error::{Result, ShelfError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity token of the active user (typically an email address).
///
/// "No active user" is expressed as `Option<UserScope>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserScope(String);

impl UserScope {
    /// Create a scope from an identity. Blank identities are rejected.
    pub fn new(identity: impl Into<String>) -> Result<Self> {
        let identity = identity.into();
        if identity.trim().is_empty() {
            return Err(ShelfError::InvalidScope(
                "identity must not be blank".to_string(),
            ));
        }
        Ok(Self(identity))
    }

    /// Map an optional identity from the session layer to a scope.
    ///
    /// Absent and blank identities both mean "logged out".
    pub fn from_identity(identity: Option<&str>) -> Option<Self> {
        identity.and_then(|id| Self::new(id).ok())
    }

    /// The raw identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
