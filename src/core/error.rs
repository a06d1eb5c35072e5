/// Error Types
///
/// Two layers of errors flow through the server:
/// - `McpError`: protocol-level failures, each carrying a JSON-RPC error code.
///   These are what the client ultimately sees in the `error` member.
/// - `ToolError`: failures raised by a tool handler (bad arguments, upstream
///   rejection, network trouble). The dispatcher always demotes these to
///   `McpError::InvalidParams` at the tool boundary.

use thiserror::Error;

/// JSON-RPC 2.0 error codes used by this server.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Protocol-level error returned to the client inside an error envelope.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error("{0}")]
    InternalError(String),
}

impl McpError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError(_) => codes::PARSE_ERROR,
            Self::InvalidRequest(_) => codes::INVALID_REQUEST,
            Self::MethodNotFound(_) | Self::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::InternalError(_) => codes::INTERNAL_ERROR,
        }
    }
}

/// Failure raised by a tool handler.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingArgument(&'static str),

    #[error("Parameter '{name}' must be a {expected}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },

    #[error("Archive API returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to reach archive API: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        McpError::InvalidParams(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_jsonrpc() {
        assert_eq!(McpError::ParseError("x".into()).code(), -32700);
        assert_eq!(McpError::InvalidRequest("x".into()).code(), -32600);
        assert_eq!(McpError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(McpError::UnknownTool("x".into()).code(), -32601);
        assert_eq!(McpError::InvalidParams("x".into()).code(), -32602);
        assert_eq!(McpError::InternalError("x".into()).code(), -32603);
    }

    #[test]
    fn tool_errors_become_invalid_params() {
        let err: McpError = ToolError::MissingArgument("a").into();
        assert_eq!(err, McpError::InvalidParams("Missing required parameter: a".into()));

        let err: McpError = ToolError::Upstream {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert_eq!(err.code(), codes::INVALID_PARAMS);
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            McpError::MethodNotFound("foo/bar".into()).to_string(),
            "Method not found: foo/bar"
        );
        assert_eq!(McpError::UnknownTool("divide".into()).to_string(), "Unknown tool: divide");
    }
}
