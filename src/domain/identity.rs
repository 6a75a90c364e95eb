//! Login identities and sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;

/// A login identity.
///
/// Created either by self-service signup or by provisioning when a player
/// is added to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Argon2 encoded password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Set for provisioned identities until the first password change.
    pub must_reset_password: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A user row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Requested username; must be unique.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Argon2 encoded password hash.
    pub password_hash: String,
    /// Whether the credential must be replaced on first use.
    pub must_reset_password: bool,
}

/// A bearer session issued at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token.
    pub token: uuid::Uuid,
    /// Authenticated user.
    pub user_id: UserId,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Longest username the `users.username` column holds, in characters.
pub const MAX_USERNAME_LEN: usize = 150;

/// Username candidates for `base`, in the order they are tried.
///
/// `alex`, `alex1`, `alex2`, … yielding at most `max_attempts` names. A
/// long `base` is cut so every candidate, suffix included, stays within
/// [`MAX_USERNAME_LEN`] characters.
pub fn username_candidates(base: &str, max_attempts: u32) -> impl Iterator<Item = String> + '_ {
    (0..max_attempts).map(move |n| {
        let suffix = if n == 0 { String::new() } else { n.to_string() };
        let room = MAX_USERNAME_LEN.saturating_sub(suffix.len());
        let mut name: String = base.chars().take(room).collect();
        name.push_str(&suffix);
        name
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_start_with_base_then_suffix() {
        let names: Vec<String> = username_candidates("alex", 4).collect();
        assert_eq!(names, vec!["alex", "alex1", "alex2", "alex3"]);
    }

    #[test]
    fn candidates_respect_cap() {
        assert_eq!(username_candidates("sam", 1).count(), 1);
        assert_eq!(username_candidates("sam", 0).count(), 0);
    }

    #[test]
    fn long_base_is_cut_to_fit_the_suffix() {
        let base = "a".repeat(MAX_USERNAME_LEN + 50);
        let names: Vec<String> = username_candidates(&base, 11).collect();
        assert!(names.iter().all(|n| n.chars().count() <= MAX_USERNAME_LEN));
        assert_eq!(names.first().map(|n| n.chars().count()), Some(MAX_USERNAME_LEN));
        assert!(names.last().is_some_and(|n| n.ends_with("a10")));

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn cut_counts_characters_not_bytes() {
        let base = "é".repeat(MAX_USERNAME_LEN);
        let names: Vec<String> = username_candidates(&base, 2).collect();
        assert_eq!(names.last().map(|n| n.chars().count()), Some(MAX_USERNAME_LEN));
        assert!(names.last().is_some_and(|n| n.ends_with("é1")));
    }

    #[test]
    fn session_expiry_is_inclusive() {
        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4(),
            user_id: UserId::new(),
            created_at: now,
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - chrono::Duration::seconds(1)));
    }
}
