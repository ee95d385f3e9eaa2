use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for users table
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub email_verified: bool,
    pub session_marker: i64, // Logout counter or unix-millis floor, see InvalidationPolicy
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new, unverified user with a fresh ID and marker 0
    pub fn new(username: String, email: String, name: Option<String>, password_hash: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            username,
            email,
            name,
            password_hash,
            email_verified: false,
            session_marker: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
