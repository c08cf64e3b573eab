pub mod model;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{AppResult, AuthError};
use crate::store::CredentialStore;
use crate::validation::{validate_email, validate_name, validate_password};
use model::{Account, NewAccount, RegistrationRequest};
use password::Passwords;
use token::TokenIssuer;

/// Outcome of a successful sign-in. `account` still holds the hash; it is
/// dropped when the account is serialized at the boundary.
#[derive(Debug)]
pub struct SignedIn {
    pub token: String,
    pub account: Account,
}

pub struct AuthService {
    accounts: Arc<dyn CredentialStore>,
    passwords: Passwords,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn CredentialStore>,
        passwords: Passwords,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            accounts,
            passwords,
            issuer,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SignedIn> {
        self.sign_in_at(email, password, Utc::now()).await
    }

    pub async fn sign_in_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<SignedIn> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            self.passwords.verify_decoy(password).await?;
            tracing::debug!("sign-in rejected: no account for this email");
            return Err(AuthError::AccountNotFound.into());
        };

        if !self.passwords.verify(password, &account.secret_hash).await? {
            tracing::debug!(account_id = account.id, "sign-in rejected: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.issuer.issue_at(&account, now)?;
        tracing::info!(account_id = account.id, "signed in");

        Ok(SignedIn { token, account })
    }

    pub async fn register(&self, request: RegistrationRequest) -> AppResult<Account> {
        let name = validate_name(&request.name)?;
        let email = validate_email(&request.email)?;
        validate_password(&request.password)?;

        let secret_hash = self.passwords.hash(&request.password).await?;
        let account = self
            .accounts
            .insert(NewAccount {
                name,
                email,
                secret_hash,
            })
            .await?;

        tracing::info!(account_id = account.id, "account registered");
        Ok(account)
    }
}
