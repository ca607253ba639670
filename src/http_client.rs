use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::{Method, Url};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;
use crate::session::Session;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn shared_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.headers_named(name).next()
    }

    pub fn headers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// One request/response exchange. The real implementation is reqwest; tests
/// script responses.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: &'static Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: shared_client(timeout)?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let resp = req.send().map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp
            .bytes()
            .map_err(|e| TransportError(format!("failed reading body: {e}")))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error")]
    Network { detail: String },
    #[error("{}", http_message(.status, .status_text, .message))]
    Http {
        status: u16,
        status_text: String,
        message: Option<String>,
    },
    #[error("{message}")]
    Rejected { message: String },
    #[error("Invalid response: {detail}")]
    Decode { detail: String },
}

fn http_message(status: &u16, status_text: &str, message: &Option<String>) -> String {
    match message {
        Some(message) => message.to_string(),
        None if status_text.is_empty() => format!("HTTP {status}"),
        None => format!("HTTP {status}: {status_text}"),
    }
}

impl ApiError {
    /// The backend's own `error` text, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// `Ok(data)` is `{success: true, data}`, `Err(e)` is `{success: false, error}`.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Session,
}

impl HttpClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: Session) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn from_config(config: &AppConfig, session: Session) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(&config.api_base_url, Arc::new(transport), session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn get_json(&self, endpoint: &str) -> ApiResult<Value> {
        self.request_json(Method::GET, endpoint, None)
    }

    pub fn post_json(&self, endpoint: &str, body: Option<&Value>) -> ApiResult<Value> {
        self.request_json(Method::POST, endpoint, body)
    }

    pub fn patch_json(&self, endpoint: &str, body: &Value) -> ApiResult<Value> {
        self.request_json(Method::PATCH, endpoint, Some(body))
    }

    pub fn delete_json(&self, endpoint: &str) -> ApiResult<Value> {
        self.request_json(Method::DELETE, endpoint, None)
    }

    /// Credentialed JSON request. Every failure mode comes back as `Err`;
    /// nothing here panics on bad input from the network.
    pub fn request_json(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::Decode {
                detail: format!("serialize request body: {e}"),
            })?;
        let request = HttpRequest {
            method: method.clone(),
            url: self.url(endpoint),
            headers: vec![
                (CONTENT_TYPE.as_str().to_string(), "application/json".to_string()),
                (ACCEPT.as_str().to_string(), "application/json".to_string()),
            ],
            body,
        };

        let resp = self.dispatch(request)?;
        let parsed = parse_body(&resp.body);

        if !resp.is_success() {
            let message = parsed
                .as_ref()
                .ok()
                .and_then(|v| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let err = ApiError::Http {
                status: resp.status,
                status_text: resp.status_text.clone(),
                message,
            };
            tracing::warn!(%method, endpoint, status = resp.status, error = %err, "request failed");
            return Err(err);
        }

        let data = parsed.map_err(|detail| {
            tracing::warn!(%method, endpoint, %detail, "response body is not json");
            ApiError::Decode { detail }
        })?;

        if data.get("success").and_then(Value::as_bool) == Some(false) {
            let message = data
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string();
            tracing::warn!(%method, endpoint, %message, "request rejected");
            return Err(ApiError::Rejected { message });
        }

        Ok(data)
    }

    /// Raw GET without JSON headers, for binary exports.
    pub fn get_bytes(&self, endpoint: &str) -> ApiResult<HttpResponse> {
        let request = HttpRequest {
            method: Method::GET,
            url: self.url(endpoint),
            headers: Vec::new(),
            body: None,
        };
        let resp = self.dispatch(request)?;
        if !resp.is_success() {
            return Err(ApiError::Http {
                status: resp.status,
                status_text: resp.status_text.clone(),
                message: None,
            });
        }
        Ok(resp)
    }

    fn dispatch(&self, mut request: HttpRequest) -> ApiResult<HttpResponse> {
        let cookie_url = Url::parse(&request.url).ok();
        if let Some(cookies) = cookie_url.as_ref().and_then(|url| self.session.cookie_header(url)) {
            request.headers.push((COOKIE.as_str().to_string(), cookies));
        }
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let resp = self.transport.send(&request).map_err(|e| {
            tracing::warn!(method = %request.method, url = %request.url, error = %e, "network failure");
            ApiError::Network { detail: e.0 }
        })?;

        if let Some(url) = &cookie_url {
            for header in resp.headers_named(SET_COOKIE.as_str()) {
                self.session.absorb_set_cookie(url, header);
            }
        }
        Ok(resp)
    }
}

fn parse_body(body: &[u8]) -> Result<Value, String> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Pulls `key` out of a response envelope such as `{"rosters": [...]}`.
pub fn take_field<T: DeserializeOwned>(data: &mut Value, key: &str) -> ApiResult<T> {
    let value = data
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode {
            detail: format!("missing `{key}` in response"),
        })?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        detail: format!("`{key}`: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_server_message() {
        let err = ApiError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
            message: Some("Roster not found".to_string()),
        };
        assert_eq!(err.to_string(), "Roster not found");

        let generic = ApiError::Http {
            status: 502,
            status_text: "Bad Gateway".to_string(),
            message: None,
        };
        assert_eq!(generic.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn header_lookup_ignores_case_and_returns_first() {
        let resp = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![
                ("Content-Disposition".to_string(), "attachment; filename=\"a.json\"".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("Set-Cookie".to_string(), "b=2".to_string()),
            ],
            body: Vec::new(),
        };
        let name = String::from("content-disposition");
        assert_eq!(resp.header(&name), Some("attachment; filename=\"a.json\""));
        assert_eq!(resp.header("SET-COOKIE"), Some("a=1"));
        assert_eq!(resp.headers_named("set-cookie").count(), 2);
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn take_field_reports_missing_key() {
        let mut data = serde_json::json!({"roster": {"id": "r1"}});
        let err = take_field::<Vec<String>>(&mut data, "rosters").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
