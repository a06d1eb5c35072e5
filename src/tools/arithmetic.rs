/// Arithmetic Tools
///
/// `add` and `multiply` take two numeric arguments `a` and `b`. Integer
/// operands are combined exactly; a float operand promotes the result.

use serde_json::Value;
use std::ops::{Add, Mul};

use crate::core::registry::{Arguments, MCPTool, ToolRegistry, ToolResult, sync_handler};
use crate::tools::validation::{Numeric, require_number};

fn binary_schema(verb: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "a": {
                "type": "number",
                "description": format!("First number to {}", verb)
            },
            "b": {
                "type": "number",
                "description": format!("Second number to {}", verb)
            }
        },
        "required": ["a", "b"]
    })
}

/// Validate `a` and `b`, then combine them with `op`.
fn apply(args: &Arguments, op: fn(Numeric, Numeric) -> Numeric) -> ToolResult {
    let a = require_number(args, "a")?;
    let b = require_number(args, "b")?;
    Ok(format!("Result: {}", op(a, b)))
}

/// Handle the `add` tool.
///
/// # Arguments
/// * `args` - Call arguments; `a` and `b` must both be numbers
///
/// # Returns
/// `"Result: <a + b>"`, or a `ToolError` naming the missing or mistyped operand
pub fn add(args: &Arguments) -> ToolResult {
    apply(args, Numeric::add)
}

/// Handle the `multiply` tool.
///
/// # Arguments
/// * `args` - Call arguments; `a` and `b` must both be numbers
///
/// # Returns
/// `"Result: <a * b>"`, or a `ToolError` naming the missing or mistyped operand
pub fn multiply(args: &Arguments) -> ToolResult {
    apply(args, Numeric::mul)
}

/// Register `add` and `multiply`.
pub fn register(registry: &mut ToolRegistry) {
    registry.register(
        MCPTool {
            name: "add".to_string(),
            description: "Add two numbers together.".to_string(),
            input_schema: binary_schema("add"),
        },
        sync_handler(add),
    );
    registry.register(
        MCPTool {
            name: "multiply".to_string(),
            description: "Multiply two numbers together.".to_string(),
            input_schema: binary_schema("multiply"),
        },
        sync_handler(multiply),
    );
}
