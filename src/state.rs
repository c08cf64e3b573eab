use std::sync::Arc;

use crate::auth::password::Passwords;
use crate::auth::token::{TokenIssuer, TokenVerifier};
use crate::auth::AuthService;
use crate::store::{CredentialStore, TaskStore};
use crate::tasks::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub verifier: Arc<TokenVerifier>,
    pub tasks: Arc<TaskService>,
    pub persistent: bool,
}

impl AppState {
    /// Wire the services around store handles created once at start-up.
    pub fn new(
        jwt_secret: &str,
        accounts: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskStore>,
        passwords: Passwords,
        persistent: bool,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                accounts.clone(),
                passwords,
                TokenIssuer::new(jwt_secret),
            )),
            verifier: Arc::new(TokenVerifier::new(jwt_secret)),
            tasks: Arc::new(TaskService::new(accounts, tasks)),
            persistent,
        }
    }
}
