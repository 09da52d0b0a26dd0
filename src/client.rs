// Eagle MCP Bridge - Eagle API Client
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Blocking HTTP client for the local Eagle API. One client per tool call:
// opened after validation, dropped when the call returns, whatever the outcome.
// Transport failures -> RemoteUnavailable, non-2xx -> RemoteRejected.

use crate::config::BridgeConfig;
use crate::error::ToolError;
use crate::translate::{Method, WireRequest};
use reqwest::blocking::{Client, Response};
use serde_json::Value;

/// The remote API as the engine sees it
pub trait RemoteApi {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value, ToolError>;

    fn post(&self, endpoint: &str, body: &Value) -> Result<Value, ToolError>;

    /// Issue a translated request
    fn send(&self, request: &WireRequest) -> Result<Value, ToolError> {
        match request.method {
            Method::Get => self.get(&request.endpoint, &request.query()),
            Method::Post => self.post(&request.endpoint, &Value::Object(request.payload.clone())),
        }
    }
}

/// Opens one remote session per invocation
pub trait Connector: Send + Sync {
    fn open(&self) -> Result<Box<dyn RemoteApi>, ToolError>;
}

/// Unwrap the `{status, data}` envelope. Anything but `status: "success"` is a rejection.
pub fn success_data(endpoint: &str, response: Value) -> Result<Value, ToolError> {
    match response.get("status").and_then(|s| s.as_str()) {
        Some("success") => Ok(response.get("data").cloned().unwrap_or(Value::Null)),
        other => {
            let mut message = format!("status={}", other.unwrap_or("missing"));
            if let Some(detail) = response.get("message").or_else(|| response.get("data")) {
                if !detail.is_null() {
                    message.push_str(&format!(", {}", preview(&detail.to_string(), 200)));
                }
            }
            Err(ToolError::RemoteRejected {
                endpoint: endpoint.to_string(),
                status: None,
                message,
            })
        }
    }
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}

/// HTTP session against one Eagle instance
pub struct EagleClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl EagleClient {
    pub fn new(config: &BridgeConfig) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(concat!("eagle-mcp-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| ToolError::RemoteUnavailable(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout().as_secs(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> ToolError {
        if e.is_timeout() {
            ToolError::RemoteUnavailable(format!("{} timed out after {}s", endpoint, self.timeout_secs))
        } else if e.is_connect() {
            ToolError::RemoteUnavailable(format!("cannot connect to {} ({})", self.base_url, e))
        } else {
            ToolError::RemoteUnavailable(format!("{} failed: {}", endpoint, e))
        }
    }

    fn read_json(&self, endpoint: &str, resp: Response) -> Result<Value, ToolError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            log::error!("HTTP {} from {}: {}", status.as_u16(), endpoint, preview(&body, 200));
            return Err(ToolError::RemoteRejected {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                message: if body.is_empty() { status.to_string() } else { preview(&body, 500) },
            });
        }
        let body = resp.text().map_err(|e| self.transport_error(endpoint, e))?;
        let value: Value = serde_json::from_str(&body).map_err(|e| ToolError::RemoteRejected {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: format!("response is not JSON ({}): {}", e, preview(&body, 200)),
        })?;
        log::debug!(
            "{} -> status={}",
            endpoint,
            value.get("status").and_then(|s| s.as_str()).unwrap_or("unknown")
        );
        Ok(value)
    }
}

impl RemoteApi for EagleClient {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value, ToolError> {
        log::debug!("GET {} {:?}", endpoint, query);
        let resp = self
            .client
            .get(self.url(endpoint))
            .query(query)
            .send()
            .map_err(|e| self.transport_error(endpoint, e))?;
        self.read_json(endpoint, resp)
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<Value, ToolError> {
        log::debug!("POST {} {}", endpoint, body);
        let resp = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .map_err(|e| self.transport_error(endpoint, e))?;
        self.read_json(endpoint, resp)
    }
}

/// Production connector: a fresh EagleClient per invocation
pub struct HttpConnector {
    config: BridgeConfig,
}

impl HttpConnector {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }
}

impl Connector for HttpConnector {
    fn open(&self) -> Result<Box<dyn RemoteApi>, ToolError> {
        Ok(Box::new(EagleClient::new(&self.config)?))
    }
}

// ============================================================================
// TEST DOUBLE
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::mock::MockApi;
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn success_envelope_yields_data() {
        let data = success_data("/api/folder/list", json!({"status": "success", "data": [1, 2]})).unwrap();
        assert_eq!(data, json!([1, 2]));
    }

    #[test]
    fn success_without_data_is_null() {
        let data = success_data("/api/item/moveToTrash", json!({"status": "success"})).unwrap();
        assert!(data.is_null());
    }

    #[test]
    fn non_success_status_is_rejected_with_detail() {
        let err = success_data(
            "/api/item/info",
            json!({"status": "error", "message": "Item does not exist"}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        let text = err.to_string();
        assert!(text.contains("status=error"));
        assert!(text.contains("Item does not exist"));
    }

    #[test]
    fn missing_status_is_rejected() {
        let err = success_data("/api/item/info", json!({"data": {}})).unwrap_err();
        assert!(err.to_string().contains("status=missing"));
    }

    #[test]
    fn send_routes_by_method() {
        let api = MockApi::new();
        let get = WireRequest {
            endpoint: "/api/item/list".into(),
            method: Method::Get,
            payload: json!({"keyword": "cat", "limit": 5}).as_object().unwrap().clone(),
        };
        api.send(&get).unwrap();
        let post = WireRequest {
            endpoint: "/api/item/update".into(),
            method: Method::Post,
            payload: json!({"id": "I1", "tags": ["a"]}).as_object().unwrap().clone(),
        };
        api.send(&post).unwrap();

        let calls = api.calls();
        assert_eq!(calls[0].method, Method::Get);
        assert_eq!(calls[0].payload, json!({"keyword": "cat", "limit": "5"}));
        assert_eq!(calls[1].method, Method::Post);
        assert_eq!(calls[1].payload, json!({"id": "I1", "tags": ["a"]}));
    }

    #[test]
    fn client_joins_urls_without_double_slashes() {
        let config = BridgeConfig { api_url: "http://localhost:41595/".into(), ..Default::default() };
        let client = EagleClient::new(&config).unwrap();
        assert_eq!(client.url("/api/item/info"), "http://localhost:41595/api/item/info");
    }

    /// One-connection HTTP server on loopback. Reads the request, writes the
    /// canned reply (if any), then holds the socket open for `hold`.
    fn serve_once(reply: Option<String>, hold: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                if let Some(reply) = reply {
                    let _ = stream.write_all(reply.as_bytes());
                    let _ = stream.flush();
                }
                thread::sleep(hold);
            }
        });
        format!("http://{}", addr)
    }

    fn http_reply(status: &str, body: &str) -> Option<String> {
        Some(format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        ))
    }

    fn client_for(api_url: String, timeout_secs: u64) -> EagleClient {
        EagleClient::new(&BridgeConfig { api_url, timeout_secs, ..Default::default() }).unwrap()
    }

    #[test]
    fn http_error_status_is_rejected_with_code_and_body() {
        let url = serve_once(http_reply("500 Internal Server Error", "library is locked"), Duration::ZERO);
        let err = client_for(url, 5).get("/api/item/info", &[("id".into(), "I1".into())]).unwrap_err();
        match &err {
            ToolError::RemoteRejected { endpoint, status, message } => {
                assert_eq!(endpoint, "/api/item/info");
                assert_eq!(*status, Some(500));
                assert_eq!(message, "library is locked");
            }
            other => panic!("expected RemoteRejected, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Eagle API rejected /api/item/info (HTTP 500): library is locked");
    }

    #[test]
    fn non_json_body_is_rejected() {
        let url = serve_once(http_reply("200 OK", "<html>not json</html>"), Duration::ZERO);
        let err = client_for(url, 5).post("/api/item/update", &json!({"id": "I1"})).unwrap_err();
        match &err {
            ToolError::RemoteRejected { status, message, .. } => {
                assert_eq!(*status, Some(200));
                assert!(message.starts_with("response is not JSON"), "{}", message);
                assert!(message.contains("<html>not json</html>"));
            }
            other => panic!("expected RemoteRejected, got {:?}", other),
        }
    }

    #[test]
    fn silent_server_times_out_as_remote_unavailable() {
        let url = serve_once(None, Duration::from_secs(5));
        let err = client_for(url, 1).get("/api/application/info", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert!(err.to_string().contains("timed out"), "{}", err);
    }

    #[test]
    fn unreachable_host_is_remote_unavailable() {
        // Port 9 (discard) on loopback is closed on any sane test machine.
        let config = BridgeConfig {
            api_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = EagleClient::new(&config).unwrap();
        let err = client.get("/api/application/info", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
    }
}
