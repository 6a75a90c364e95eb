//! Identity service: provisioning, signup, login sessions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::credentials;
use crate::config::MAX_SESSION_TTL_HOURS;
use crate::domain::identity::{MAX_USERNAME_LEN, username_candidates};
use crate::domain::{NewUser, Session, User};
use crate::error::BookingError;
use crate::persistence::BookingStore;

/// An identity created on behalf of a player.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProvisionedIdentity {
    /// The created user.
    pub user: User,
    /// One-time password; must be changed at first login.
    pub temporary_password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Authenticated user.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub token: Uuid,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Creates and authenticates login identities.
///
/// Provisioning is an explicit call made by the add-players use case,
/// never a side effect of persisting a player.
#[derive(Debug, Clone)]
pub struct IdentityService {
    store: Arc<dyn BookingStore>,
    max_suffix_attempts: u32,
    session_ttl: Duration,
}

impl IdentityService {
    /// Creates a new `IdentityService`.
    ///
    /// `session_ttl_hours` is clamped to `1..=MAX_SESSION_TTL_HOURS`.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, max_suffix_attempts: u32, session_ttl_hours: i64) -> Self {
        Self {
            store,
            max_suffix_attempts,
            session_ttl: Duration::hours(session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
        }
    }

    /// Creates a login for a player named `name`.
    ///
    /// The username is the trimmed name, suffixed `1`, `2`, … on collision
    /// and cut to [`MAX_USERNAME_LEN`] characters. Each candidate is a separate insert guarded by the unique username
    /// constraint, so two concurrent provisions cannot end up with the same
    /// name. The credential is a random one-time password flagged for
    /// reset.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::IdentityConflict`] once the suffix attempts
    /// are exhausted, [`BookingError::InvalidRequest`] for a blank name.
    pub async fn provision(
        &self,
        name: &str,
        email: &str,
    ) -> Result<ProvisionedIdentity, BookingError> {
        let base = name.trim();
        if base.is_empty() {
            return Err(BookingError::InvalidRequest(
                "player name must not be empty".to_string(),
            ));
        }

        let temporary_password = credentials::temporary_password();
        let password_hash =
            credentials::hash_password_blocking(temporary_password.clone()).await?;

        for username in username_candidates(base, self.max_suffix_attempts) {
            let new_user = NewUser {
                username,
                email: email.trim().to_string(),
                password_hash: password_hash.clone(),
                must_reset_password: true,
            };
            match self.store.insert_user(new_user).await {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, username = %user.username, "identity provisioned");
                    return Ok(ProvisionedIdentity {
                        user,
                        temporary_password,
                    });
                }
                Err(BookingError::UsernameTaken(taken)) => {
                    tracing::debug!(username = %taken, "username taken, trying next suffix");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(base, attempts = self.max_suffix_attempts, "username space exhausted");
        Err(BookingError::IdentityConflict(format!(
            "no free username for {base:?} after {} attempts",
            self.max_suffix_attempts
        )))
    }

    /// Self-service account creation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for a blank or overlong
    /// username or a weak password, [`BookingError::IdentityConflict`] if
    /// the username is taken.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, BookingError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(BookingError::InvalidRequest(
                "username must not be empty".to_string(),
            ));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(BookingError::InvalidRequest(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        credentials::check_password_strength(password)?;

        let password_hash = credentials::hash_password_blocking(password.to_string()).await?;
        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                email: email.trim().to_string(),
                password_hash,
                must_reset_password: false,
            })
            .await
            .map_err(|e| match e {
                BookingError::UsernameTaken(name) => {
                    BookingError::IdentityConflict(format!("username {name:?} is already taken"))
                }
                other => other,
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "account created");
        Ok(user)
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Unauthorized`] for an unknown user or wrong
    /// password.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, BookingError> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            tracing::warn!(username, "login for unknown user");
            return Err(BookingError::Unauthorized);
        };

        let valid = credentials::verify_password_blocking(
            user.password_hash.clone(),
            password.to_string(),
        )
        .await?;
        if !valid {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(BookingError::Unauthorized);
        }

        let now = Utc::now();
        let purged = self.store.purge_expired_sessions(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }

        let session = Session {
            token: Uuid::new_v4(),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        let token = session.token;
        let expires_at = session.expires_at;
        self.store.insert_session(session).await?;

        tracing::info!(user_id = %user.id, "login");
        Ok(LoginOutcome {
            user,
            token,
            expires_at,
        })
    }

    /// Ends a session.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::PersistenceError`] on storage failure.
    pub async fn logout(&self, token: Uuid) -> Result<(), BookingError> {
        self.store.delete_session(token).await
    }

    /// Resolves a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Unauthorized`] for unknown or expired tokens.
    pub async fn authenticate(&self, token: Uuid) -> Result<User, BookingError> {
        let session = self
            .store
            .find_session(token, Utc::now())
            .await?
            .ok_or(BookingError::Unauthorized)?;
        self.store
            .get_user(session.user_id)
            .await?
            .ok_or(BookingError::Unauthorized)
    }

    /// Replaces a password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Unauthorized`] if `current` is wrong,
    /// [`BookingError::InvalidRequest`] if `new_password` is weak.
    pub async fn change_password(
        &self,
        user: &User,
        current: &str,
        new_password: &str,
    ) -> Result<(), BookingError> {
        let valid =
            credentials::verify_password_blocking(user.password_hash.clone(), current.to_string())
                .await?;
        if !valid {
            return Err(BookingError::Unauthorized);
        }
        credentials::check_password_strength(new_password)?;
        let hash = credentials::hash_password_blocking(new_password.to_string()).await?;
        self.store.update_password(user.id, &hash).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn make_service(max_attempts: u32) -> IdentityService {
        IdentityService::new(Arc::new(MemoryStore::new()), max_attempts, 1)
    }

    #[tokio::test]
    async fn provision_suffixes_colliding_names() {
        let service = make_service(10);
        let mut names = Vec::new();
        for _ in 0..3 {
            let Ok(identity) = service.provision("  Alex ", "alex@example.com").await else {
                panic!("provision failed");
            };
            names.push(identity.user.username);
        }
        assert_eq!(names, vec!["Alex", "Alex1", "Alex2"]);
    }

    #[tokio::test]
    async fn provision_flags_reset_and_never_uses_fixed_password() {
        let service = make_service(10);
        let Ok(a) = service.provision("Sam", "sam@example.com").await else {
            panic!("provision failed");
        };
        let Ok(b) = service.provision("Sam", "sam@example.com").await else {
            panic!("provision failed");
        };
        assert!(a.user.must_reset_password);
        assert_ne!(a.temporary_password, b.temporary_password);
        assert_ne!(a.user.password_hash, a.temporary_password);
    }

    #[tokio::test]
    async fn provision_gives_up_after_cap() {
        let service = make_service(2);
        assert!(service.provision("Kim", "k@example.com").await.is_ok());
        assert!(service.provision("Kim", "k@example.com").await.is_ok());
        let third = service.provision("Kim", "k@example.com").await;
        assert!(matches!(third, Err(BookingError::IdentityConflict(_))));
    }

    #[tokio::test]
    async fn provision_cuts_long_names_to_the_username_limit() {
        let service = make_service(10);
        let name = "a".repeat(300);
        let Ok(first) = service.provision(&name, "a@example.com").await else {
            panic!("provision failed");
        };
        let Ok(second) = service.provision(&name, "a@example.com").await else {
            panic!("provision failed");
        };
        assert_eq!(first.user.username.chars().count(), MAX_USERNAME_LEN);
        assert_eq!(second.user.username.chars().count(), MAX_USERNAME_LEN);
        assert!(second.user.username.ends_with('1'));
        assert_ne!(first.user.username, second.user.username);
    }

    #[tokio::test]
    async fn out_of_range_session_ttl_is_clamped() {
        for hours in [i64::MAX, i64::MIN, 0, -5] {
            let service = IdentityService::new(Arc::new(MemoryStore::new()), 10, hours);
            assert!(service.signup("val", "v@example.com", "password1").await.is_ok());
            let Ok(outcome) = service.login("val", "password1").await else {
                panic!("login failed for ttl {hours}");
            };
            assert!(outcome.expires_at > Utc::now());
            assert!(service.authenticate(outcome.token).await.is_ok());
        }
    }

    #[tokio::test]
    async fn provisioned_password_logs_in_and_can_be_changed() {
        let service = make_service(10);
        let Ok(identity) = service.provision("Lee", "lee@example.com").await else {
            panic!("provision failed");
        };
        let Ok(outcome) = service.login("Lee", &identity.temporary_password).await else {
            panic!("login failed");
        };
        assert!(outcome.user.must_reset_password);

        let changed = service
            .change_password(&outcome.user, &identity.temporary_password, "a new secret")
            .await;
        assert!(changed.is_ok());

        let Ok(user) = service.authenticate(outcome.token).await else {
            panic!("authenticate failed");
        };
        assert!(!user.must_reset_password);
    }

    #[tokio::test]
    async fn signup_login_logout() {
        let service = make_service(10);
        assert!(service.signup("jo", "jo@example.com", "password1").await.is_ok());

        let duplicate = service.signup("jo", "other@example.com", "password2").await;
        assert!(matches!(duplicate, Err(BookingError::IdentityConflict(_))));

        let wrong = service.login("jo", "nope-nope").await;
        assert!(matches!(wrong, Err(BookingError::Unauthorized)));

        let Ok(outcome) = service.login("jo", "password1").await else {
            panic!("login failed");
        };
        assert!(service.authenticate(outcome.token).await.is_ok());

        assert!(service.logout(outcome.token).await.is_ok());
        let after = service.authenticate(outcome.token).await;
        assert!(matches!(after, Err(BookingError::Unauthorized)));
    }

    #[tokio::test]
    async fn signup_rejects_weak_password() {
        let service = make_service(10);
        let result = service.signup("pat", "pat@example.com", "short").await;
        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
    }
}
