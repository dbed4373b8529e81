//! Administrator credentials: argon2id hashing, verification, first-boot
//! bootstrap and password rotation.
//!
//! There is no session: a successful `verify` is the whole login.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::store::Store;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use std::sync::Arc;
use tracing::{info, warn};

pub const USERNAME_KEY: &str = "admin_username";
pub const PASSWORD_KEY: &str = "admin_password";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Tunable argon2 cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashCost {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            memory_kib: cfg.hash_memory_kib,
            iterations: cfg.hash_iterations,
            parallelism: cfg.hash_parallelism,
        }
    }

    fn hasher(&self) -> AppResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash with a fresh random salt; returns the PHC string.
pub fn hash_password(cost: HashCost, password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = cost
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string. The cost parameters are
/// read from the hash itself, so rotating the configured cost does not
/// invalidate existing hashes.
pub fn verify_password(password: &str, stored: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AppError::Hash(format!("stored password hash is unreadable: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Hash(e.to_string())),
    }
}

#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn Store>,
    cost: HashCost,
}

impl Credentials {
    pub fn new(store: Arc<dyn Store>, cost: HashCost) -> Self {
        Self { store, cost }
    }

    async fn hash(&self, password: &str) -> AppResult<String> {
        let cost = self.cost;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_password(cost, &password)).await?
    }

    async fn check(&self, password: &str, stored: String) -> AppResult<bool> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?
    }

    async fn stored(&self) -> AppResult<(Option<String>, Option<String>)> {
        let username = self.store.get_setting(USERNAME_KEY).await?;
        let password = self.store.get_setting(PASSWORD_KEY).await?;
        Ok((username, password))
    }

    /// Create the default identity when credentials are missing.
    ///
    /// Returns `true` when the defaults were written. The defaults are
    /// well known, so this always warns.
    pub async fn ensure_bootstrap(&self, username: &str, password: &str) -> AppResult<bool> {
        if let (Some(_), Some(_)) = self.stored().await? {
            return Ok(false);
        }

        warn!("No admin credentials found! Creating default credentials for user '{username}'.");
        warn!("CHANGE THE ADMIN PASSWORD IMMEDIATELY after first login.");

        let hashed = self.hash(password).await?;
        self.store.set_setting(USERNAME_KEY, username).await?;
        self.store.set_setting(PASSWORD_KEY, &hashed).await?;
        info!("admin credentials initialized");
        Ok(true)
    }

    /// Exact username match and password hash check.
    ///
    /// Unconfigured when either credential setting is missing.
    pub async fn verify(&self, username: &str, password: &str) -> AppResult<bool> {
        let (Some(stored_user), Some(stored_hash)) = self.stored().await? else {
            return Err(AppError::credentials_unconfigured());
        };

        // Hash check runs even on a username mismatch so both failures cost
        // the same.
        let password_ok = self.check(password, stored_hash).await?;
        Ok(password_ok && username == stored_user)
    }

    /// Rotate the admin password.
    ///
    /// Order of checks: new password length, configured credentials, current
    /// password. Nothing is written unless all three pass.
    pub async fn change_password(&self, current: &str, new: &str) -> AppResult<()> {
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "New password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let Some(stored_hash) = self.store.get_setting(PASSWORD_KEY).await? else {
            return Err(AppError::credentials_unconfigured());
        };

        if !self.check(current, stored_hash).await? {
            return Err(AppError::Unauthorized("Current password is incorrect".into()));
        }

        let hashed = self.hash(new).await?;
        self.store.set_setting(PASSWORD_KEY, &hashed).await?;
        info!("admin password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    // Minimum argon2 cost keeps the tests fast.
    const CHEAP: HashCost = HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    fn credentials() -> (Arc<dyn Store>, Credentials) {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let creds = Credentials::new(Arc::clone(&store), CHEAP);
        (store, creds)
    }

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let a = hash_password(CHEAP, "admin123").unwrap();
        let b = hash_password(CHEAP, "admin123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &a).unwrap());
        assert!(!verify_password("admin124", &a).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(AppError::Hash(_))
        ));
    }

    #[tokio::test]
    async fn bootstrap_runs_once() {
        let (store, creds) = credentials();
        assert!(creds.ensure_bootstrap("admin", "admin123").await.unwrap());
        let first = store.get_setting(PASSWORD_KEY).await.unwrap();

        assert!(!creds.ensure_bootstrap("admin", "other-pass").await.unwrap());
        assert_eq!(store.get_setting(PASSWORD_KEY).await.unwrap(), first);
        assert_eq!(
            store.get_setting(USERNAME_KEY).await.unwrap().as_deref(),
            Some("admin")
        );
    }

    #[tokio::test]
    async fn verify_requires_both_username_and_password() {
        let (_, creds) = credentials();
        creds.ensure_bootstrap("admin", "admin123").await.unwrap();

        assert!(creds.verify("admin", "admin123").await.unwrap());
        assert!(!creds.verify("Admin", "admin123").await.unwrap());
        assert!(!creds.verify("admin", "wrong").await.unwrap());
        assert!(!creds.verify("", "").await.unwrap());
    }

    #[tokio::test]
    async fn verify_without_credentials_is_unconfigured() {
        let (_, creds) = credentials();
        let err = creds.verify("admin", "admin123").await.unwrap_err();
        assert!(matches!(err, AppError::Unconfigured(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected_without_writing() {
        let (store, creds) = credentials();
        creds.ensure_bootstrap("admin", "admin123").await.unwrap();
        let before = store.get_setting(PASSWORD_KEY).await.unwrap();

        let err = creds.change_password("admin123", "short").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(store.get_setting(PASSWORD_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn wrong_current_password_is_unauthorized() {
        let (store, creds) = credentials();
        creds.ensure_bootstrap("admin", "admin123").await.unwrap();
        let before = store.get_setting(PASSWORD_KEY).await.unwrap();

        let err = creds
            .change_password("nope", "long-enough-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(store.get_setting(PASSWORD_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn password_rotation_takes_effect() {
        let (_, creds) = credentials();
        creds.ensure_bootstrap("admin", "admin123").await.unwrap();

        creds
            .change_password("admin123", "correct horse")
            .await
            .unwrap();
        assert!(creds.verify("admin", "correct horse").await.unwrap());
        assert!(!creds.verify("admin", "admin123").await.unwrap());
    }
}
