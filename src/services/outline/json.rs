//! Outline provider reading a recorded `documentSymbol` response
//!
//! The file holds either the bare response (`DocumentSymbol[]`,
//! `SymbolInformation[]` or `null`) or an object with `symbols` and optional
//! `foldingRanges` members. It is served for every document and re-read on
//! each fetch.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::OutlineProvider;
use super::converters::{parse_document_symbols, parse_folding_ranges};
use crate::error::LspError;
use crate::infra::lsp::protocol::LspFoldingRange;
use crate::models::lsp::FoldingRange;
use crate::models::symbol::Symbol;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bundle {
    symbols: Value,
    #[serde(default)]
    folding_ranges: Vec<LspFoldingRange>,
}

enum Recording {
    Bundle(Bundle),
    Response(Value),
}

pub struct JsonOutlineProvider {
    source: PathBuf,
}

impl JsonOutlineProvider {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    async fn load(&self) -> Result<Recording, LspError> {
        let text = tokio::fs::read_to_string(&self.source).await?;
        let invalid = |e: serde_json::Error| {
            LspError::Protocol(format!("Invalid outline file {}: {}", self.source.display(), e))
        };

        let value: Value = serde_json::from_str(&text).map_err(invalid)?;
        if value.get("symbols").is_some() {
            Ok(Recording::Bundle(
                serde_json::from_value(value).map_err(invalid)?,
            ))
        } else {
            Ok(Recording::Response(value))
        }
    }
}

#[async_trait]
impl OutlineProvider for JsonOutlineProvider {
    async fn fetch_outline(&self, document: &Path) -> Result<Option<Vec<Symbol>>, LspError> {
        tracing::debug!(
            "Serving outline for {} from {}",
            document.display(),
            self.source.display()
        );
        match self.load().await? {
            Recording::Bundle(bundle) => parse_document_symbols(bundle.symbols),
            Recording::Response(response) => parse_document_symbols(response),
        }
    }

    async fn folding_ranges(&self, _document: &Path) -> Result<Vec<FoldingRange>, LspError> {
        match self.load().await? {
            Recording::Bundle(bundle) => Ok(parse_folding_ranges(bundle.folding_ranges)),
            Recording::Response(_) => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lsp::FoldingRangeKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const STRUCT_A: &str = r#"{
        "name": "A",
        "kind": 23,
        "range": {"start": {"line": 0, "character": 0}, "end": {"line": 4, "character": 1}},
        "selectionRange": {"start": {"line": 0, "character": 7}, "end": {"line": 0, "character": 8}}
    }"#;

    fn recording(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_bare_response() {
        let file = recording(&format!("[{}]", STRUCT_A));
        let provider = JsonOutlineProvider::new(file.path());

        let symbols = provider
            .fetch_outline(Path::new("any.rs"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "A");
        assert!(
            provider
                .folding_ranges(Path::new("any.rs"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_bundle_with_folding_ranges() {
        let file = recording(&format!(
            r#"{{
                "symbols": [{}],
                "foldingRanges": [{{"startLine": 0, "endLine": 4}}, {{"startLine": 6, "endLine": 8, "kind": "comment"}}]
            }}"#,
            STRUCT_A
        ));
        let provider = JsonOutlineProvider::new(file.path());

        let symbols = provider
            .fetch_outline(Path::new("other.rs"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(symbols[0].name, "A");

        let ranges = provider.folding_ranges(Path::new("other.rs")).await.unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].kind, FoldingRangeKind::Comment);
    }

    #[tokio::test]
    async fn test_null_response_has_no_outline() {
        let file = recording("null");
        let provider = JsonOutlineProvider::new(file.path());
        assert!(
            provider
                .fetch_outline(Path::new("a.rs"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_missing_or_invalid_file() {
        let provider = JsonOutlineProvider::new("/nonexistent/symnav/outline.json");
        assert!(matches!(
            provider.fetch_outline(Path::new("a.rs")).await,
            Err(LspError::Io(_))
        ));

        let file = recording("{ not json");
        let provider = JsonOutlineProvider::new(file.path());
        assert!(matches!(
            provider.fetch_outline(Path::new("a.rs")).await,
            Err(LspError::Protocol(_))
        ));
    }
}
