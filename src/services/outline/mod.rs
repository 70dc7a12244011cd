//! Outline providers
//!
//! Where raw document symbols come from: a live language server, or a
//! recorded `documentSymbol` response on disk.

mod converters;
mod json;
mod lsp;

use std::path::Path;

use async_trait::async_trait;

use crate::error::LspError;
use crate::models::lsp::FoldingRange;
use crate::models::symbol::Symbol;

pub use converters::{parse_document_symbols, parse_folding_ranges};
pub use json::JsonOutlineProvider;
pub use lsp::LspOutlineProvider;

#[async_trait]
pub trait OutlineProvider: Send + Sync {
    /// Raw symbol tree for a document
    ///
    /// `Ok(None)` means the provider has nothing for this document yet.
    async fn fetch_outline(&self, document: &Path) -> Result<Option<Vec<Symbol>>, LspError>;

    async fn folding_ranges(&self, _document: &Path) -> Result<Vec<FoldingRange>, LspError> {
        Ok(Vec::new())
    }

    /// The editor closed the document
    async fn document_closed(&self, _document: &Path) {}

    async fn shutdown(&self) {}
}
