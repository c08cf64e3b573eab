use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{AppError, AppResult};

const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// argon2 hashing, run off the async workers since it is deliberately slow.
#[derive(Clone, Default)]
pub struct Passwords {
    argon: Argon2<'static>,
    /// Hash checked when sign-in names no account, built with the same
    /// parameters as real hashes so both paths cost one verification.
    decoy: Arc<OnceCell<String>>,
}

impl Passwords {
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
        })
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
    }

    /// `false` for a wrong password and for a stored hash that does not parse.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();
        tokio::task::spawn_blocking(move || match PasswordHash::new(&stored_hash) {
            Ok(parsed) => argon.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!("stored password hash is unreadable: {}", e);
                false
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))
    }

    /// Spend one full verification without a stored hash to compare with.
    pub async fn verify_decoy(&self, password: &str) -> AppResult<()> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await?;
        self.verify(password, decoy).await?;
        Ok(())
    }

    /// Build the decoy hash up front so the first unknown-email sign-in is
    /// not slower than the rest.
    pub async fn warm_up(&self) -> AppResult<()> {
        self.decoy
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await?;
        Ok(())
    }

    #[cfg(test)]
    pub fn decoy_hash(&self) -> Option<&str> {
        self.decoy.get().map(String::as_str)
    }
}

/// Cheap parameters so tests do not spend seconds per hash.
#[cfg(test)]
pub fn fast_passwords() -> Passwords {
    let params = argon2::Params::new(1024, 1, 1, None).expect("valid argon2 params");
    Passwords {
        argon: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        decoy: Arc::default(),
    }
}
