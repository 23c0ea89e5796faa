//! User profile rows.

use serde::{Deserialize, Serialize};

use crate::Email;

fn null_as_default<'de, D>(deserializer: D) -> Result<UserMetadata, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<UserMetadata>::deserialize(deserializer)?.unwrap_or_default())
}

/// Free-form profile metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A row in the backend's `users` table.
///
/// Credentials are handled exclusively by the auth service; this row never
/// carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Email,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: UserMetadata,
}

impl UserProfile {
    /// Build a profile for a new signup.
    #[must_use]
    pub fn new(email: Email, name: Option<String>) -> Self {
        let name = name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        Self {
            email,
            metadata: UserMetadata { name },
        }
    }
}
