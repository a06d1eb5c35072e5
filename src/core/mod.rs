/// Core Server Framework Module
///
/// This module contains the protocol machinery, independent of any tool:
/// - protocol.rs: JSON-RPC envelope decoding and encoding
/// - error.rs: protocol and tool error types
/// - registry.rs: immutable tool registry
/// - dispatcher.rs: method routing and tool invocation
/// - server.rs: HTTP and STDIO transports
/// - config.rs: environment configuration

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
