/// MCP Envelope Codec
///
/// Decodes raw request bodies into JSON-RPC 2.0 envelopes and encodes
/// results or errors back into response envelopes. Decoding is a pure
/// transform: it never touches the tool registry and never performs I/O.
///
/// Classification rules:
/// - A body that is not JSON is a parse error.
/// - A `method` without an `id` is a notification and never gets a response.
/// - `id` may be a string or an integer; `null` is treated as absent.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::core::error::McpError;

/// JSON-RPC version tag every request must carry.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Request identifier, echoed back verbatim in the response.
///
/// Integer ids keep their original digits, so ids wider than 64 bits
/// round-trip unchanged.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(Number),
    String(String),
}

impl RequestId {
    /// Accept a string or an integer; anything else is not a valid id.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s)),
            Value::Number(n) if !n.to_string().contains(['.', 'e', 'E']) => {
                Some(RequestId::Number(n))
            }
            _ => None,
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

/// Decoded JSON-RPC request or notification.
#[derive(Debug, Clone, PartialEq)]
pub struct MCPRequest {
    /// Version tag as sent by the client, if it was a string.
    pub jsonrpc: Option<String>,
    /// None for notifications.
    pub id: Option<RequestId>,
    pub method: String,
    pub params: Option<Map<String, Value>>,
}

impl MCPRequest {
    /// Whether the envelope carries the `"2.0"` version tag.
    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc.as_deref() == Some(JSONRPC_VERSION)
    }
}

/// Result of classifying a decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Expects exactly one response envelope.
    Request(MCPRequest),
    /// Expects no response at all.
    Notification(MCPRequest),
}

/// An envelope that could not be decoded, with whatever id could be salvaged.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub id: Option<RequestId>,
    pub error: McpError,
}

impl Rejected {
    fn new(id: Option<RequestId>, error: McpError) -> Self {
        Self { id, error }
    }

    pub fn into_response(self) -> MCPResponse {
        MCPResponse::failure(self.id, &self.error)
    }
}

/// Decode a raw request body.
pub fn decode(body: &[u8]) -> Result<Incoming, Rejected> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Rejected::new(None, McpError::ParseError(e.to_string())))?;
    decode_value(value)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: Value) -> Result<Incoming, Rejected> {
    let Value::Object(mut envelope) = value else {
        return Err(Rejected::new(
            None,
            McpError::InvalidRequest("envelope must be a JSON object".to_string()),
        ));
    };

    let id = match envelope.remove("id") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(RequestId::from_value(raw).ok_or_else(|| {
            Rejected::new(
                None,
                McpError::InvalidRequest("id must be a string or an integer".to_string()),
            )
        })?),
    };

    let method = match envelope.remove("method") {
        Some(Value::String(method)) => method,
        Some(_) => {
            return Err(Rejected::new(
                id,
                McpError::InvalidRequest("method must be a string".to_string()),
            ));
        }
        None => {
            return Err(Rejected::new(
                id,
                McpError::InvalidRequest("missing method".to_string()),
            ));
        }
    };

    let jsonrpc = match envelope.remove("jsonrpc") {
        Some(Value::String(tag)) => Some(tag),
        _ => None,
    };

    let params = envelope.remove("params");

    if id.is_none() {
        // Notifications are never answered, so malformed params are ignored.
        let params = match params {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        return Ok(Incoming::Notification(MCPRequest {
            jsonrpc,
            id,
            method,
            params,
        }));
    }

    let params = match params {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(Rejected::new(
                id,
                McpError::InvalidRequest("params must be an object".to_string()),
            ));
        }
    };

    Ok(Incoming::Request(MCPRequest {
        jsonrpc,
        id,
        method,
        params,
    }))
}

/// JSON-RPC 2.0 response envelope.
///
/// Exactly one of `result` and `error` is present. `id` is always
/// serialized, as `null` when the request had none.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPResponse {
    jsonrpc: &'static str,
    id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPError {
    code: i32,
    message: String,
}

impl MCPResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<RequestId>, error: &McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(MCPError {
                code: error.code(),
                message: error.to_string(),
            }),
        }
    }
}
