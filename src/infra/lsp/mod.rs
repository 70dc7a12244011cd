//! LSP infrastructure
//!
//! - JSON-RPC 2.0 protocol types
//! - Content-Length framed transport
//! - Per-language client with document sync
//! - Server manager and default server table

pub mod client;
pub mod manager;
pub mod protocol;
pub mod servers;
pub mod transport;

pub use client::LspClient;
pub use manager::LspManager;
pub use servers::ServerConfig;
