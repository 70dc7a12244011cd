//! Data models for symnav
//!
//! Contains core type definitions used throughout the application.

pub mod config;
pub mod lsp;
pub mod symbol;

// Re-export commonly used types
pub use config::SymnavConfig;
pub use lsp::{FoldingRange, FoldingRangeKind, Position, Range, Selection};
pub use symbol::{Language, Symbol, SymbolKind};
