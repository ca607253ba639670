use anyhow::{Result, bail};

use crate::auth_api::AuthApi;
use crate::models::User;

pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        bail!("Username is required");
    }
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(())
}

/// Login screen state. The service throws; this store catches and keeps the
/// message in `error` so the screen can render it.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    pub user: Option<User>,
    pub error: Option<String>,
    pub loading: bool,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Marks a login/register as in flight; `false` when the input was
    /// rejected before any request.
    pub fn begin(&mut self, username: &str, password: &str) -> bool {
        self.error = None;
        if let Err(err) = validate_credentials(username, password) {
            self.error = Some(err.to_string());
            return false;
        }
        self.loading = true;
        true
    }

    pub fn settle(&mut self, result: Result<User>) -> bool {
        self.loading = false;
        match result {
            Ok(user) => {
                self.user = Some(user);
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub fn login(&mut self, api: &AuthApi, username: &str, password: &str) -> bool {
        if !self.begin(username, password) {
            return false;
        }
        let result = api.login(username.trim(), password);
        self.settle(result)
    }

    pub fn register(&mut self, api: &AuthApi, username: &str, password: &str) -> bool {
        if !self.begin(username, password) {
            return false;
        }
        let result = api.register(username.trim(), password);
        self.settle(result)
    }

    pub fn settle_logout(&mut self, result: Result<()>) -> bool {
        self.loading = false;
        match result {
            Ok(()) => {
                self.user = None;
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub fn logout(&mut self, api: &AuthApi) -> bool {
        self.loading = true;
        let result = api.logout();
        self.settle_logout(result)
    }

    /// App start: ask the backend who is logged in.
    pub fn restore(&mut self, api: &AuthApi) -> Option<&User> {
        self.user = api.current_user();
        self.error = None;
        self.user.as_ref()
    }
}
