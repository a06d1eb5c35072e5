/// MCP Dispatcher
///
/// Routes decoded envelopes to the protocol methods and produces exactly one
/// response per request (none for notifications). The dispatcher is
/// transport-agnostic: the HTTP and STDIO servers both hand it raw bodies.
///
/// Two error boundaries exist:
/// - Tool boundary: any failure inside a tool handler, including a panic,
///   becomes `INVALID_PARAMS`.
/// - Dispatcher boundary: any other fault while routing, including a panic,
///   becomes `INTERNAL_ERROR`.

use futures_util::future::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::core::error::McpError;
use crate::core::protocol::{self, Incoming, MCPRequest, MCPResponse, PROTOCOL_VERSION};
use crate::core::registry::ToolRegistry;

/// Name and version reported by `initialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Shared request dispatcher. Cloning shares the same registry.
#[derive(Clone)]
pub struct Dispatcher {
    info: Arc<ServerInfo>,
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(info: ServerInfo, registry: Arc<ToolRegistry>) -> Self {
        Self {
            info: Arc::new(info),
            registry,
        }
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Decode and handle a raw request body.
    ///
    /// Returns `None` for notifications, which must not be answered.
    pub async fn handle_body(&self, body: &[u8]) -> Option<MCPResponse> {
        match protocol::decode(body) {
            Ok(incoming) => self.handle(incoming).await,
            Err(rejected) => {
                warn!(error = %rejected.error, "rejected malformed envelope");
                Some(rejected.into_response())
            }
        }
    }

    /// Handle an already-decoded envelope.
    ///
    /// Requests get exactly one response; errors and panics raised while
    /// routing become error envelopes that echo the request id.
    ///
    /// # Arguments
    /// * `incoming` - Classified envelope from the codec
    pub async fn handle(&self, incoming: Incoming) -> Option<MCPResponse> {
        let request = match incoming {
            Incoming::Notification(notification) => {
                debug!(method = %notification.method, "notification received");
                return None;
            }
            Incoming::Request(request) => request,
        };

        let id = request.id.clone();
        let outcome = AssertUnwindSafe(self.route(request)).catch_unwind().await;
        let response = match outcome {
            Ok(Ok(result)) => MCPResponse::success(id, result),
            Ok(Err(err)) => {
                match &err {
                    McpError::InternalError(_) => error!(error = %err, "internal error"),
                    _ => debug!(error = %err, "request failed"),
                }
                MCPResponse::failure(id, &err)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(%message, "dispatcher panicked");
                MCPResponse::failure(id, &McpError::InternalError(message))
            }
        };
        Some(response)
    }

    /// Check the version tag and route a request to its method.
    ///
    /// Any error returned here, or any panic raised while it runs, is turned
    /// into a response envelope by `handle`.
    ///
    /// # Arguments
    /// * `request` - Decoded request with a non-null id
    async fn route(&self, request: MCPRequest) -> Result<Value, McpError> {
        if !request.has_valid_version() {
            return Err(McpError::InvalidRequest(format!(
                "jsonrpc must be \"{}\"",
                protocol::JSONRPC_VERSION
            )));
        }

        debug!(method = %request.method, "dispatching");
        match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "tools/list" => self.tools_list(),
            "tools/call" => self.tools_call(request.params).await,
            #[cfg(test)]
            "test/fault" => panic!("routing table corrupted"),
            _ => Err(McpError::MethodNotFound(request.method)),
        }
    }

    /// Handle MCP initialize: protocol version, capabilities and server info.
    fn initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version
            }
        })
    }

    /// Handle MCP tools/list: every registered tool descriptor, in
    /// registration order.
    fn tools_list(&self) -> Result<Value, McpError> {
        let tools = serde_json::to_value(self.registry.tools())
            .map_err(|e| McpError::InternalError(e.to_string()))?;
        Ok(serde_json::json!({ "tools": tools }))
    }

    /// Handle MCP tools/call.
    ///
    /// Extracts the tool name and arguments, looks the handler up in the
    /// registry and awaits it. The handler's text is wrapped in a single
    /// text content item. Handler errors and panics both come back as
    /// `InvalidParams`, so a broken tool never produces `INTERNAL_ERROR`.
    ///
    /// # Arguments
    /// * `params` - Method parameters containing `name` and `arguments`
    async fn tools_call(&self, params: Option<Map<String, Value>>) -> Result<Value, McpError> {
        let missing = || McpError::InvalidParams("Missing name/arguments".to_string());

        let mut params = params.ok_or_else(missing)?;
        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(missing()),
        };
        let arguments = match params.remove("arguments") {
            Some(Value::Object(arguments)) => arguments,
            None | Some(Value::Null) => return Err(missing()),
            Some(_) => {
                return Err(McpError::InvalidParams(
                    "arguments must be an object".to_string(),
                ));
            }
        };

        let handler = self
            .registry
            .handler(&name)
            .ok_or_else(|| McpError::UnknownTool(name.clone()))?;

        let outcome = AssertUnwindSafe(async { handler(arguments).await })
            .catch_unwind()
            .await;
        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!(tool = %name, error = %err, "tool call failed");
                return Err(err.into());
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = %name, %message, "tool panicked");
                return Err(McpError::InvalidParams(message));
            }
        };

        Ok(serde_json::json!({
            "content": [
                {
                    "type": "text",
                    "text": text
                }
            ]
        }))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
