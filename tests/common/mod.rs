#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use roster_terminal::http_client::{HttpClient, HttpRequest, HttpResponse, Transport, TransportError};
use roster_terminal::provider::Services;
use roster_terminal::session::Session;
use serde_json::Value;

pub const BASE_URL: &str = "http://backend.test";

/// Replays queued responses in order and records every request it saw.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(json_response(status, body));
    }

    pub fn push_network_error(&self, detail: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError(detail.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: serde_json::to_vec(&body).expect("serialize body"),
    }
}

pub fn client(transport: &Arc<ScriptedTransport>) -> HttpClient {
    HttpClient::new(BASE_URL, transport.clone(), Session::new())
}

pub fn backend_url(path: &str) -> reqwest::Url {
    reqwest::Url::parse(&format!("{BASE_URL}{path}")).expect("backend url")
}

pub fn services(transport: &Arc<ScriptedTransport>) -> Services {
    Services::new(client(transport))
}

pub fn request_body(request: &HttpRequest) -> Value {
    let body = request.body.as_deref().expect("request has a body");
    serde_json::from_slice(body).expect("json body")
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

pub fn player_json(id: &str, roster_id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "firstName": "Sam",
        "lastName": "Hill",
        "jerseyNumber": 12,
        "position": 0,
        "age": 24,
        "height": 74,
        "weightPounds": 60,
        "overallRating": 81,
        "isImpactPlayer": false,
        "rosterId": roster_id,
        "speed": 88,
        "throwPower": 91,
        "loadouts": []
    })
}

pub fn roster_json(id: &str, name: &str) -> Value {
    serde_json::json!({
        "rosterId": id,
        "name": name,
        "userId": "u1",
        "players": []
    })
}
