/// Reverse Tool
///
/// Reverses a string by Unicode scalar value, so multi-byte characters
/// survive intact.

use crate::core::registry::{Arguments, MCPTool, ToolRegistry, ToolResult, sync_handler};
use crate::tools::validation::require_string;

pub fn reverse(args: &Arguments) -> ToolResult {
    let text = require_string(args, "text")?;
    let reversed: String = text.chars().rev().collect();
    Ok(format!("Result: {}", reversed))
}

pub fn register(registry: &mut ToolRegistry) {
    let tool = MCPTool {
        name: "reverse".to_string(),
        description: "Reverse a string.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text to reverse"
                }
            },
            "required": ["text"]
        }),
    };
    registry.register(tool, sync_handler(reverse));
}
