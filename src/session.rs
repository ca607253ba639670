use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// App started, backend not asked yet.
    #[default]
    Uninitialized,
    Anonymous,
    Authenticated(User),
}

#[derive(Debug, Default)]
struct SessionInner {
    phase: SessionPhase,
    jar: Jar,
}

/// Process-wide login session. The HTTP client attaches its cookies to every
/// request and folds `Set-Cookie` responses back in; stores read the phase.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        // A poisoned session only means a panic mid-update; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase.clone()
    }

    pub fn user(&self) -> Option<User> {
        match &self.lock().phase {
            SessionPhase::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.lock().phase, SessionPhase::Authenticated(_))
    }

    pub fn set_user(&self, user: User) {
        self.lock().phase = SessionPhase::Authenticated(user);
    }

    pub fn mark_anonymous(&self) {
        self.lock().phase = SessionPhase::Anonymous;
    }

    /// Logout: forget the user and every cookie.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.phase = SessionPhase::Anonymous;
        inner.jar = Jar::default();
    }

    /// `Cookie` header value for a request to `url`. Domain, path, expiry
    /// and `Secure` rules come from the jar.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let value = self.lock().jar.cookies(url)?;
        value.to_str().ok().map(str::to_string)
    }

    /// Stores one `Set-Cookie` header received from `url`. An expired cookie
    /// removes the stored one of the same name.
    pub fn absorb_set_cookie(&self, url: &Url, header: &str) {
        let Ok(value) = HeaderValue::from_str(header) else {
            tracing::debug!(%url, "ignoring unparseable set-cookie header");
            return;
        };
        self.lock().jar.set_cookies(&mut std::iter::once(&value), url);
    }
}
