//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum username length accepted at signup
pub const USERNAME_MAX_LENGTH: usize = 150;

/// A registered account.
///
/// Users own comments and notes; ownership is what every mutating
/// operation is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an already hashed password.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
