//! Shared request builder, executor and paginator for the admin API.
//!
//! # Design
//! `AdminClient` holds a `ClientConfig` and an injected `Transport`; it keeps
//! no mutable state between calls. Building a request (`new_request`) is pure
//! and separate from executing it (`execute`), so resource services can be
//! tested at either step. Every call that reaches the transport takes an
//! explicit cancellation token.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pagination::{ListOpt, ListPage};
use crate::transport::Transport;

/// Synchronous client for the admin API.
#[derive(Debug, Clone)]
pub struct AdminClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> AdminClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request for `path` (relative to the base URL).
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = self.config.headers.clone();
        let body = match body {
            Some(body) => {
                let json = serde_json::to_string(body)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(json)
            }
            None => None,
        };
        Ok(HttpRequest {
            method,
            path: format!("{}{}", self.config.base_url, path),
            query,
            headers,
            body,
        })
    }

    /// Send `request` and decode a successful body into `O`.
    pub fn execute<O: DeserializeOwned>(
        &self,
        ctx: &CancellationToken,
        request: HttpRequest,
    ) -> Result<O, ApiError> {
        let response = self.round_trip(ctx, request)?;
        parse_body(&response)
    }

    /// Send `request`, ignoring any successful body.
    pub fn execute_empty(&self, ctx: &CancellationToken, request: HttpRequest) -> Result<(), ApiError> {
        self.round_trip(ctx, request).map(|_| ())
    }

    /// Fetch one page of the collection at `path`.
    ///
    /// Records are returned undecoded, alongside the options for the next
    /// page (`None` once the collection is exhausted).
    pub fn list(
        &self,
        ctx: &CancellationToken,
        path: &str,
        opt: &ListOpt,
    ) -> Result<(Vec<Value>, Option<ListOpt>), ApiError> {
        let request = self.new_request::<()>(HttpMethod::Get, path, opt.to_query(), None)?;
        let page: ListPage = self.execute(ctx, request)?;
        let next = opt.next_from(&page)?;
        Ok((page.data, next))
    }

    fn round_trip(&self, ctx: &CancellationToken, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let method = request.method;
        let url = request.path.clone();
        debug!(%method, %url, "admin request");

        let response = self.transport.send(request)?;
        debug!(%method, %url, status = response.status, "admin response");

        // A token cancelled mid-flight discards whatever came back.
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        check_status(&response)?;
        Ok(response)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .map(|b| b.message)
        .unwrap_or_else(|_| response.body.clone());
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

fn parse_body<O: DeserializeOwned>(response: &HttpResponse) -> Result<O, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Canned {
        responses: Mutex<Vec<HttpResponse>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self {
                responses: Mutex::new(vec![HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                }]),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ApiError::Transport("no response queued".to_string()))
        }
    }

    fn client(transport: Canned) -> AdminClient<Canned> {
        AdminClient::new(
            ClientConfig::new("http://localhost:8001/").with_header("kong-admin-token", "t"),
            transport,
        )
    }

    #[test]
    fn new_request_without_body() {
        let c = client(Canned::new(200, "{}"));
        let req = c
            .new_request::<()>(HttpMethod::Get, "/groups/abc", Vec::new(), None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8001/groups/abc");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("kong-admin-token".to_string(), "t".to_string())]
        );
    }

    #[test]
    fn new_request_with_body_sets_content_type() {
        let c = client(Canned::new(200, "{}"));
        let body = serde_json::json!({"name": "ops"});
        let req = c
            .new_request(HttpMethod::Post, "/groups", Vec::new(), Some(&body))
            .unwrap();
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn execute_maps_404_to_not_found() {
        let c = client(Canned::new(404, r#"{"message":"Not found"}"#));
        let req = c.new_request::<()>(HttpMethod::Get, "/groups/x", Vec::new(), None).unwrap();
        let err = c.execute::<Value>(&CancellationToken::new(), req).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn execute_surfaces_server_message() {
        let c = client(Canned::new(409, r#"{"message":"UNIQUE violation detected on '{name=\"ops\"}'"}"#));
        let req = c.new_request::<()>(HttpMethod::Post, "/groups", Vec::new(), None).unwrap();
        let err = c.execute::<Value>(&CancellationToken::new(), req).unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 409);
                assert!(message.starts_with("UNIQUE violation"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn execute_keeps_raw_body_when_not_json() {
        let c = client(Canned::new(500, "internal error"));
        let req = c.new_request::<()>(HttpMethod::Get, "/groups", Vec::new(), None).unwrap();
        let err = c.execute::<Value>(&CancellationToken::new(), req).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, ref message } if message == "internal error"));
    }

    #[test]
    fn execute_reports_bad_json() {
        let c = client(Canned::new(200, "not json"));
        let req = c.new_request::<()>(HttpMethod::Get, "/groups/x", Vec::new(), None).unwrap();
        let err = c.execute::<Value>(&CancellationToken::new(), req).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn cancelled_token_sends_nothing() {
        let c = client(Canned::new(200, "{}"));
        let ctx = CancellationToken::new();
        ctx.cancel();
        let req = c.new_request::<()>(HttpMethod::Delete, "/groups/x", Vec::new(), None).unwrap();
        let err = c.execute_empty(&ctx, req).unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
        assert!(c.transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn list_passes_options_and_returns_next() {
        let c = client(Canned::new(
            200,
            r#"{"data":[{"id":"a"},{"id":"b"}],"next":"/groups?offset=o1","offset":"o1"}"#,
        ));
        let (data, next) = c
            .list(&CancellationToken::new(), "/groups", &ListOpt::with_size(2))
            .unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["id"], "a");
        assert_eq!(next.unwrap().offset.as_deref(), Some("o1"));

        let sent = c.transport.sent.lock().unwrap();
        assert_eq!(sent[0].path, "http://localhost:8001/groups");
        assert_eq!(sent[0].query_value("size"), Some("2"));
    }
}
