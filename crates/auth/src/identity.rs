//! External identity provider boundary.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::AuthUser;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email is required")]
    MissingEmail,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Identity provider contract.
///
/// Implementations talk to the hosted auth service; the application only
/// consumes the resulting [`AuthUser`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;

    /// Observe the signed-in user (`None` when signed out).
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    is_admin: bool,
}

/// In-memory identity provider for tests/dev.
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    current: watch::Sender<Option<AuthUser>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current,
        }
    }

    /// Register (or replace) an account.
    pub fn with_account(self, email: &str, password: &str, is_admin: bool) -> Self {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.insert(
                normalize_email(email),
                Account {
                    password: password.to_string(),
                    is_admin,
                },
            );
        }
        self
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }

        let account = {
            let accounts = self
                .accounts
                .read()
                .map_err(|_| AuthError::Unavailable("lock poisoned".to_string()))?;
            accounts.get(&email).cloned()
        };

        match account {
            Some(account) if account.password == password => {
                let user = AuthUser::from_admin_flag(email, account.is_admin);
                self.current.send_replace(Some(user.clone()));
                tracing::info!(email = user.email(), role = %user.role(), "user signed in");
                Ok(user)
            }
            _ => {
                tracing::warn!(email = %email, "sign-in rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn logout(&self) -> Result<(), AuthError> {
        if let Some(user) = self.current.send_replace(None) {
            tracing::info!(email = user.email(), "user signed out");
        }
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}
