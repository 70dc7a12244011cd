//! symnav - Hierarchical symbol navigation library
//!
//! Resolves the parent, current, child and sibling symbols around a cursor
//! from a language server's document outline, and drives cursor moves
//! between them.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infra;
pub mod models;
pub mod nav;
pub mod services;

pub use error::{LspError, SymnavError, SymnavResult};
