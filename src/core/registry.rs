/// Tool Registry
///
/// Maps tool names to their descriptors and handlers. The registry is built
/// once at startup, wrapped in an `Arc`, and only read afterwards, so worker
/// threads share it without any locking.

use futures_util::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::ToolError;

/// Arguments supplied to a `tools/call` invocation.
pub type Arguments = Map<String, Value>;

/// What every tool handler eventually produces.
pub type ToolResult = Result<String, ToolError>;

/// Tool handler function type.
///
/// Every handler returns a boxed future, whether or not it performs I/O, so
/// the dispatcher awaits all tools the same way.
pub type ToolHandler = Box<dyn Fn(Arguments) -> BoxFuture<'static, ToolResult> + Send + Sync>;

/// Wrap a synchronous function as a `ToolHandler`.
pub fn sync_handler<F>(f: F) -> ToolHandler
where
    F: Fn(&Arguments) -> ToolResult + Send + Sync + 'static,
{
    Box::new(move |args: Arguments| future::ready(f(&args)).boxed())
}

/// MCP tool descriptor as listed by `tools/list`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPTool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Registry of available MCP tools.
pub struct ToolRegistry {
    /// Descriptors in registration order (for tools/list)
    tools: Vec<MCPTool>,
    /// Handlers keyed by tool name (for tools/call)
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        assert!(
            !self.handlers.contains_key(&tool.name),
            "tool '{}' registered twice",
            tool.name
        );
        self.handlers.insert(tool.name.clone(), handler);
        self.tools.push(tool);
    }

    /// Freeze the registry for shared, read-only use.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn tools(&self) -> &[MCPTool] {
        &self.tools
    }

    pub fn handler(&self, name: &str) -> Option<&ToolHandler> {
        self.handlers.get(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
