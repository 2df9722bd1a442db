//! Login accounts.

use crate::types::{DbId, Timestamp};

/// A stored account. Holds the password hash, so it is never serialized.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating an account. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
