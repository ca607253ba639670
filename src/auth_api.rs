use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::http_client::{ApiError, HttpClient, take_field};
use crate::models::User;

/// Login, registration and session checks. Unlike the other services,
/// login/register/logout fail with an error carrying the server's message.
#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self.credentials_call("/api/auth/login", username, password, "Login failed")?;
        tracing::info!(user_id = %user.user_id, "logged in");
        Ok(user)
    }

    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        let user = self.credentials_call(
            "/api/auth/register",
            username,
            password,
            "Registration failed",
        )?;
        tracing::info!(user_id = %user.user_id, "registered");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.http
            .post_json("/api/auth/logout", None)
            .map_err(|e| auth_error(e, "Logout failed"))?;
        self.http.session().clear();
        tracing::info!("logged out");
        Ok(())
    }

    /// `None` means "not logged in", which is a normal state rather than an
    /// error. Any failure, network included, lands there too.
    pub fn current_user(&self) -> Option<User> {
        let user = self
            .http
            .get_json("/api/auth/user")
            .ok()
            .and_then(|mut data| take_field::<User>(&mut data, "user").ok());
        match &user {
            Some(user) => self.http.session().set_user(user.clone()),
            None => self.http.session().mark_anonymous(),
        }
        user
    }

    fn credentials_call(
        &self,
        endpoint: &str,
        username: &str,
        password: &str,
        fallback: &str,
    ) -> Result<User> {
        let body = json!({ "username": username, "password": password });
        let mut data: Value = self
            .http
            .post_json(endpoint, Some(&body))
            .map_err(|e| auth_error(e, fallback))?;
        let user: User = take_field(&mut data, "user").map_err(|e| auth_error(e, fallback))?;
        self.http.session().set_user(user.clone());
        Ok(user)
    }
}

fn auth_error(err: ApiError, fallback: &str) -> anyhow::Error {
    let message = match &err {
        ApiError::Network { .. } => err.to_string(),
        _ => err.server_message().unwrap_or(fallback).to_string(),
    };
    anyhow!(message)
}
