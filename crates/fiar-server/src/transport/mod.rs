//! Transports carrying MCP JSON-RPC traffic

pub mod stdio;
