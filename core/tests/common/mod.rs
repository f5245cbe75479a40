//! Scripted in-memory transport shared by the service tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use groups_core::{
    AdminClient, ApiError, CancellationToken, ClientConfig, HttpRequest, HttpResponse, Transport,
};

pub const BASE_URL: &str = "http://admin.test:8001";

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    sent: Mutex<Vec<HttpRequest>>,
    cancel_on_send: Option<CancellationToken>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        });
        self
    }

    /// Cancel `token` while each request is in flight, before answering.
    pub fn cancelling(mut self, token: &CancellationToken) -> Self {
        self.cancel_on_send = Some(token.clone());
        self
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.lock().unwrap().push(request);
        if let Some(token) = &self.cancel_on_send {
            token.cancel();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("script exhausted".to_string()))
    }
}

pub fn client(transport: &ScriptedTransport) -> AdminClient<&ScriptedTransport> {
    AdminClient::new(ClientConfig::new(BASE_URL), transport)
}
