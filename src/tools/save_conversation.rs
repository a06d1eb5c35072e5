/// Save Conversation Tool
///
/// Uploads a conversation transcript to the archival API as a multipart form
/// (`POST {base}/api/conversation`) and reports the URL the archive assigned.
/// This is the only tool that performs I/O; the request is non-blocking and
/// bounded by a fixed timeout. There are no retries.

use futures_util::future::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::error::ToolError;
use crate::core::registry::{Arguments, MCPTool, ToolRegistry, ToolResult};
use crate::tools::validation::require_string;

/// Upper bound on a single upload, connection included.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

const MODEL_NAME: &str = "Claude (MCP)";

/// Client for the archival API.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct ArchiveClient {
    client: Client,
    base_url: String,
}

impl ArchiveClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, UPLOAD_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/conversation", self.base_url)
    }

    /// Upload one conversation. Anything but `201 Created` is a failure.
    pub async fn save(&self, conversation: String) -> ToolResult {
        let document = Part::text(conversation)
            .file_name("conversation.txt")
            .mime_str("text/plain")?;
        let form = Form::new()
            .part("htmlDoc", document)
            .text("model", MODEL_NAME)
            .text("skipScraping", "");

        let endpoint = self.endpoint();
        debug!(%endpoint, "uploading conversation");
        let response = self.client.post(&endpoint).multipart(form).send().await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = body_text(response.text().await);
            return Err(ToolError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        // A 201 with an unreadable body still counts as saved.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let url = body.get("url").and_then(Value::as_str).unwrap_or("N/A");
        Ok(format!("Conversation saved successfully. URL: {}", url))
    }
}

/// Error body of a rejected upload; a failed read is reported in its place.
fn body_text(read: reqwest::Result<String>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to read archive error body");
            format!("<failed to read response body: {}>", e)
        }
    }
}

pub fn register(registry: &mut ToolRegistry, archive: ArchiveClient) {
    let tool = MCPTool {
        name: "save_conversation".to_string(),
        description: "Save the current conversation to the archive and return its URL.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "conversation": {
                    "type": "string",
                    "description": "Full text of the conversation to archive"
                }
            },
            "required": ["conversation"]
        }),
    };

    registry.register(
        tool,
        Box::new(move |args: Arguments| {
            let archive = archive.clone();
            async move {
                let conversation = require_string(&args, "conversation")?.to_string();
                archive.save(conversation).await
            }
            .boxed()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry_for(base_url: &str) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register(&mut registry, ArchiveClient::new(base_url).unwrap());
        registry
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = ArchiveClient::new("http://archive.local:8000/").unwrap();
        assert_eq!(client.endpoint(), "http://archive.local:8000/api/conversation");
    }

    #[actix_rt::test]
    async fn uploads_multipart_form_and_reports_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversation"))
            .and(body_string_contains("name=\"htmlDoc\"; filename=\"conversation.txt\""))
            .and(body_string_contains("text/plain"))
            .and(body_string_contains("name=\"model\""))
            .and(body_string_contains("Claude (MCP)"))
            .and(body_string_contains("name=\"skipScraping\""))
            .and(body_string_contains("user: hi\nassistant: hello"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"url": "https://archive.example/c/42"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ArchiveClient::new(&server.uri()).unwrap();
        let result = client
            .save("user: hi\nassistant: hello".to_string())
            .await
            .unwrap();
        assert_eq!(
            result,
            "Conversation saved successfully. URL: https://archive.example/c/42"
        );
    }

    #[actix_rt::test]
    async fn missing_url_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;

        let client = ArchiveClient::new(&server.uri()).unwrap();
        let result = client.save("x".to_string()).await.unwrap();
        assert!(result.ends_with("URL: N/A"));
    }

    #[actix_rt::test]
    async fn non_created_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversation"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&server)
            .await;

        let client = ArchiveClient::new(&server.uri()).unwrap();
        let err = client.save("x".to_string()).await.unwrap_err();
        match &err {
            ToolError::Upstream { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "database unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("database unavailable"));
    }

    #[actix_rt::test]
    async fn ok_is_not_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "u"})))
            .mount(&server)
            .await;

        let client = ArchiveClient::new(&server.uri()).unwrap();
        assert!(matches!(
            client.save("x".to_string()).await,
            Err(ToolError::Upstream { status: 200, .. })
        ));
    }

    #[actix_rt::test]
    async fn truncated_error_body_is_reported() {
        use std::io::{Read, Write};

        // Answers 500 with a body shorter than its Content-Length, then hangs up.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let upstream = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.ends_with(b"--\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial")
                .unwrap();
        });

        let client = ArchiveClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.save("x".to_string()).await.unwrap_err();
        upstream.join().unwrap();
        match err {
            ToolError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert!(body.starts_with("<failed to read response body: "), "{}", body);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn read_failures_fill_the_body() {
        let read_error = reqwest::get("http://127.0.0.1:1").await.unwrap_err();
        let body = body_text(Err(read_error));
        assert!(body.starts_with("<failed to read response body: "), "{}", body);
        assert_eq!(body_text(Ok("plain".to_string())), "plain");
    }

    #[actix_rt::test]
    async fn unreachable_host_is_network_error() {
        let client = ArchiveClient::new("http://127.0.0.1:1").unwrap();
        let err = client.save("x".to_string()).await.unwrap_err();
        assert!(matches!(err, ToolError::Network(_)));
    }

    #[actix_rt::test]
    async fn slow_archive_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = ArchiveClient::with_timeout(&server.uri(), Duration::from_millis(200)).unwrap();
        let err = client.save("x".to_string()).await.unwrap_err();
        match err {
            ToolError::Network(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn handler_validates_before_uploading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let registry = registry_for(&server.uri());
        let handler = registry.handler("save_conversation").unwrap();
        assert!(matches!(
            handler(args(json!({}))).await,
            Err(ToolError::MissingArgument("conversation"))
        ));
        assert!(matches!(
            handler(args(json!({"conversation": 5}))).await,
            Err(ToolError::WrongType { .. })
        ));
    }
}
