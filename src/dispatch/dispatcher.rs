// Dispatcher: one POST per call, `output` extracted from the reply
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use super::endpoint::EndpointIdentity;
use crate::error::RelayError;
use crate::models::InvokeRequest;

/// Displayed in place of generated text when the reply has no usable `output`.
pub const FALLBACK_MESSAGE: &str = "Error: Unexpected response format";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    // No deadline unless one is set
    pub timeout: Option<Duration>,
}

impl DispatcherConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of one call that reached the endpoint and got a complete reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded(String),
    // Reply had no usable `output`; the raw upstream payload is kept for diagnostics
    Fallback { status: u16, body: String },
}

impl DispatchOutcome {
    pub fn from_reply(status: u16, body: &[u8]) -> Self {
        match extract_output(body) {
            Some(output) => DispatchOutcome::Succeeded(output),
            None => DispatchOutcome::Fallback {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DispatchOutcome::Fallback { .. })
    }

    // Collapse to the string the presentation layer shows
    pub fn into_display(self) -> String {
        match self {
            DispatchOutcome::Succeeded(output) => output,
            DispatchOutcome::Fallback { .. } => FALLBACK_MESSAGE.to_string(),
        }
    }
}

// `output` as text: strings as-is, other non-null values as compact JSON
pub fn extract_output(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("output")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: Client,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// POST `request` to `{base}{route}/invoke` and classify the reply.
    /// Only transport failures are returned as errors.
    pub async fn dispatch(
        &self,
        endpoint: &EndpointIdentity,
        request: &InvokeRequest,
    ) -> Result<DispatchOutcome, RelayError> {
        let url = endpoint.invoke_url();
        debug!("Dispatching to {}", url);

        let mut builder = self.client.post(&url).json(request);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let outcome = DispatchOutcome::from_reply(status.as_u16(), &body);
        if let DispatchOutcome::Fallback { status, body } = &outcome {
            warn!("Unexpected response format from {} (status {}): {}", url, status, body);
        }
        Ok(outcome)
    }

    /// Like `dispatch`, but the unexpected-shape case becomes
    /// [`FALLBACK_MESSAGE`] so callers always have something to display.
    pub async fn invoke(&self, endpoint: &EndpointIdentity, request: &InvokeRequest) -> Result<String, RelayError> {
        Ok(self.dispatch(endpoint, request).await?.into_display())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn endpoint(server: &mockito::Server, route: &str) -> EndpointIdentity {
        EndpointIdentity::new(&server.url(), route).unwrap()
    }

    #[test]
    fn test_extract_output() {
        assert_eq!(extract_output(br#"{"output": "hello"}"#), Some("hello".to_string()));
        assert_eq!(extract_output(br#"{"output": {"content": "hi"}}"#), Some(r#"{"content":"hi"}"#.to_string()));
        assert_eq!(extract_output(br#"{"output": null}"#), None);
        assert_eq!(extract_output(br#"{"foo": "bar"}"#), None);
        assert_eq!(extract_output(br#"["output"]"#), None);
        assert_eq!(extract_output(br#"{"output": "hel"#), None);
        assert_eq!(extract_output(b""), None);
    }

    #[tokio::test]
    async fn test_invoke_returns_output() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/story/invoke")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"input": {"topic": "cats"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output": "hello", "metadata": {"run_id": "x"}}"#)
            .create_async()
            .await;

        let dispatcher = Dispatcher::default();
        let output = dispatcher
            .invoke(&endpoint(&server, "/story"), &InvokeRequest::single("topic", "cats"))
            .await
            .unwrap();

        assert_eq!(output, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_output_key_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/story/invoke")
            .with_status(200)
            .with_body(r#"{"foo": "bar"}"#)
            .create_async()
            .await;

        let dispatcher = Dispatcher::default();
        let request = InvokeRequest::single("topic", "cats");
        let output = dispatcher.invoke(&endpoint(&server, "/story"), &request).await.unwrap();
        assert_eq!(output, "Error: Unexpected response format");

        let outcome = dispatcher.dispatch(&endpoint(&server, "/story"), &request).await.unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Fallback {
                status: 200,
                body: r#"{"foo": "bar"}"#.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_truncated_body_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/poem/invoke")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output": "roses are"#)
            .create_async()
            .await;

        let output = Dispatcher::default()
            .invoke(&endpoint(&server, "/poem"), &InvokeRequest::single("topic", "roses"))
            .await
            .unwrap();
        assert_eq!(output, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_error_status_without_output_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/story/invoke")
            .with_status(500)
            .with_body(r#"{"detail": "model backend error"}"#)
            .create_async()
            .await;

        let outcome = Dispatcher::default()
            .dispatch(&endpoint(&server, "/story"), &InvokeRequest::single("topic", "x"))
            .await
            .unwrap();
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_display(), FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_connection_refused_propagates() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = EndpointIdentity::new(&format!("http://127.0.0.1:{}", port), "/story").unwrap();
        let err = Dispatcher::default()
            .invoke(&endpoint, &InvokeRequest::single("topic", "cats"))
            .await
            .unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {:?}", err);
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        // Accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let endpoint = EndpointIdentity::new(&format!("http://{}", addr), "/story").unwrap();
        let dispatcher = Dispatcher::new(DispatcherConfig::default().with_timeout(Duration::from_millis(200)));
        let err = dispatcher
            .invoke(&endpoint, &InvokeRequest::single("topic", "cats"))
            .await
            .unwrap_err();
        match err {
            RelayError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {:?}", other),
        }
        hold.abort();
    }

    #[tokio::test]
    async fn test_routes_do_not_cross() {
        let mut server = mockito::Server::new_async().await;
        let story = server
            .mock("POST", "/story/invoke")
            .with_status(200)
            .with_body(r#"{"output": "a story"}"#)
            .expect(1)
            .create_async()
            .await;
        let poem = server
            .mock("POST", "/poem/invoke")
            .with_status(200)
            .with_body(r#"{"output": "a poem"}"#)
            .expect(1)
            .create_async()
            .await;

        let dispatcher = Dispatcher::default();
        let request = InvokeRequest::single("topic", "autumn");
        let first = dispatcher.invoke(&endpoint(&server, "/story"), &request).await.unwrap();
        let second = dispatcher.invoke(&endpoint(&server, "/poem"), &request).await.unwrap();

        assert_eq!(first, "a story");
        assert_eq!(second, "a poem");
        story.assert_async().await;
        poem.assert_async().await;
    }
}
