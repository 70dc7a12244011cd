//! Outline provider backed by a language server

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use super::OutlineProvider;
use super::converters::{parse_document_symbols, parse_folding_ranges};
use crate::error::LspError;
use crate::infra::lsp::LspManager;
use crate::infra::lsp::protocol::{LspFoldingRange, TextDocumentParams};
use crate::models::config::LspConfig;
use crate::models::lsp::{FoldingRange, path_to_uri};
use crate::models::symbol::{Language, Symbol};

const BINARY_PROBE_LEN: usize = 8192;

pub struct LspOutlineProvider {
    manager: Arc<LspManager>,
}

impl LspOutlineProvider {
    pub fn new(root: &Path, config: &LspConfig) -> Self {
        Self::with_manager(Arc::new(LspManager::new(root.to_path_buf(), config)))
    }

    pub fn with_manager(manager: Arc<LspManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<LspManager> {
        &self.manager
    }

    fn language_for(document: &Path) -> Result<Language, LspError> {
        match Language::from_path(document) {
            Language::Unknown => Err(LspError::UnsupportedLanguage(
                document
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            )),
            language => Ok(language),
        }
    }

    /// Read the document, sync it to the server and send `method` for it
    async fn document_request(
        &self,
        document: &Path,
        method: &'static str,
    ) -> Result<serde_json::Value, LspError> {
        let language = Self::language_for(document)?;
        let content = read_file_validated(document).await?;
        let uri = path_to_uri(document);

        self.manager
            .with_client(language, |client| {
                let content = content.clone();
                let uri = uri.clone();
                async move {
                    client.sync_document(&uri, &content).await?;
                    let params = serde_json::to_value(TextDocumentParams::new(uri))?;
                    client.request(method, Some(params)).await
                }
            })
            .await
    }
}

#[async_trait]
impl OutlineProvider for LspOutlineProvider {
    async fn fetch_outline(&self, document: &Path) -> Result<Option<Vec<Symbol>>, LspError> {
        let result = self
            .document_request(document, "textDocument/documentSymbol")
            .await?;
        let symbols = parse_document_symbols(result)?;

        tracing::debug!(
            "documentSymbol for {}: {} top-level symbols",
            document.display(),
            symbols.as_ref().map_or(0, Vec::len)
        );
        Ok(symbols)
    }

    async fn folding_ranges(&self, document: &Path) -> Result<Vec<FoldingRange>, LspError> {
        let language = Self::language_for(document)?;
        let client = self.manager.get_client(language).await?;
        if !client.supports_folding_ranges().await {
            tracing::debug!("{} server has no foldingRange support", language);
            return Ok(Vec::new());
        }

        let result = self
            .document_request(document, "textDocument/foldingRange")
            .await?;
        let ranges: Option<Vec<LspFoldingRange>> = serde_json::from_value(result)
            .map_err(|e| LspError::Protocol(format!("Invalid FoldingRange: {}", e)))?;

        Ok(parse_folding_ranges(ranges.unwrap_or_default()))
    }

    async fn document_closed(&self, document: &Path) {
        let Ok(language) = Self::language_for(document) else {
            return;
        };
        if let Some(client) = self.manager.existing_client(language).await
            && let Err(e) = client.close_document(&path_to_uri(document)).await
        {
            tracing::debug!("didClose for {} failed: {}", document.display(), e);
        }
    }

    async fn shutdown(&self) {
        self.manager.shutdown_all().await;
    }
}

/// Read a document for the server, rejecting oversized and binary files
async fn read_file_validated(file: &Path) -> Result<String, LspError> {
    let max_size = crate::config::max_file_size_bytes();
    let mut f = tokio::fs::File::open(file).await?;
    let file_size = f.metadata().await?.len();

    if max_size != u64::MAX && file_size > max_size {
        return Err(LspError::FileTooLarge {
            path: file.display().to_string(),
            size_mb: file_size / 1024 / 1024,
            limit_mb: max_size / 1024 / 1024,
        });
    }

    let mut bytes = Vec::with_capacity(file_size as usize);
    f.read_to_end(&mut bytes).await?;

    let probe_len = bytes.len().min(BINARY_PROBE_LEN);
    if bytes[..probe_len].contains(&0) {
        return Err(LspError::Protocol(format!(
            "Cannot process binary file: {}",
            file.display()
        )));
    }

    String::from_utf8(bytes)
        .map_err(|_| LspError::Protocol(format!("Cannot process binary file: {}", file.display())))
}
