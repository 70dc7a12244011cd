//! Per-document outline cache
//!
//! Holds the normalized outline and the navigation session of every document
//! that has been navigated in. Both are evicted together whenever the document
//! changes, closes, or loses focus.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;

use super::normalize::normalize;
use super::outline::Outline;
use super::session::NavigationSession;
use crate::services::outline::OutlineProvider;

struct DocumentEntry {
    outline: Arc<Outline>,
    session: NavigationSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct SymbolIndex {
    provider: Arc<dyn OutlineProvider>,
    entries: RwLock<HashMap<PathBuf, DocumentEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SymbolIndex {
    pub fn new(provider: Arc<dyn OutlineProvider>) -> Self {
        Self {
            provider,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> &Arc<dyn OutlineProvider> {
        &self.provider
    }

    /// Normalized outline for `document`, fetching it on a miss.
    ///
    /// Empty or failed fetches yield an empty outline and are not cached.
    pub async fn get_outline(&self, document: &Path) -> Arc<Outline> {
        if let Some(entry) = self.entries.read().await.get(document) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Outline cache hit: {}", document.display());
            return Arc::clone(&entry.outline);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Outline cache miss: {}", document.display());

        let raw = match self.provider.fetch_outline(document).await {
            Ok(Some(symbols)) if !symbols.is_empty() => symbols,
            Ok(_) => {
                tracing::info!("No symbols for {}", document.display());
                return Arc::new(Outline::empty());
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    "Outline for {} unavailable, retrying on next request: {}",
                    document.display(),
                    e
                );
                return Arc::new(Outline::empty());
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch outline for {} [{}]: {}",
                    document.display(),
                    e.error_code(),
                    e
                );
                return Arc::new(Outline::empty());
            }
        };

        let outline = Arc::new(normalize(raw));
        tracing::debug!(
            "Indexed {} symbols for {}",
            outline.len(),
            document.display()
        );

        self.entries.write().await.insert(
            document.to_path_buf(),
            DocumentEntry {
                outline: Arc::clone(&outline),
                session: NavigationSession::new(),
            },
        );

        outline
    }

    /// Cached outline without fetching
    pub async fn cached(&self, document: &Path) -> Option<Arc<Outline>> {
        self.entries
            .read()
            .await
            .get(document)
            .map(|entry| Arc::clone(&entry.outline))
    }

    /// Run `f` against the session of `document`.
    ///
    /// Returns `None` when the document is not cached or was re-indexed since
    /// `outline` was handed out, so stale symbol paths never reach a session.
    pub async fn with_session<R>(
        &self,
        document: &Path,
        outline: &Arc<Outline>,
        f: impl FnOnce(&mut NavigationSession) -> R,
    ) -> Option<R> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(document)?;
        if !Arc::ptr_eq(&entry.outline, outline) {
            return None;
        }
        Some(f(&mut entry.session))
    }

    /// Run `f` against the session of `document` regardless of outline version
    pub async fn with_current_session<R>(
        &self,
        document: &Path,
        f: impl FnOnce(&mut NavigationSession) -> R,
    ) -> Option<R> {
        let mut entries = self.entries.write().await;
        entries.get_mut(document).map(|entry| f(&mut entry.session))
    }

    pub async fn invalidate(&self, document: &Path) -> bool {
        let removed = self.entries.write().await.remove(document).is_some();
        if removed {
            tracing::debug!("Evicted outline: {}", document.display());
        }
        removed
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        if count > 0 {
            tracing::debug!("Evicted {} outlines", count);
        }
    }

    pub async fn stats(&self) -> IndexStats {
        IndexStats {
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::LspError;
    use crate::models::lsp::{Position, Range};
    use crate::models::symbol::{Symbol, SymbolKind};
    use crate::nav::outline::SymbolPath;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Provider serving a fixed outline and counting fetches
    pub(crate) struct FixedProvider {
        symbols: Option<Vec<Symbol>>,
        fail: bool,
        pub(crate) fetches: AtomicUsize,
    }

    impl FixedProvider {
        pub(crate) fn new(symbols: Vec<Symbol>) -> Self {
            Self {
                symbols: Some(symbols),
                fail: false,
                fetches: AtomicUsize::new(0),
            }
        }

        pub(crate) fn none() -> Self {
            Self {
                symbols: None,
                fail: false,
                fetches: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                symbols: None,
                fail: true,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OutlineProvider for FixedProvider {
        async fn fetch_outline(&self, _document: &Path) -> Result<Option<Vec<Symbol>>, LspError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LspError::Timeout("textDocument/documentSymbol".to_string()));
            }
            Ok(self.symbols.clone())
        }
    }

    fn lines(start: u32, end: u32) -> Range {
        Range::new(Position::new(start, 0), Position::new(end, 1))
    }

    fn sample() -> Vec<Symbol> {
        vec![
            Symbol::new("Y", SymbolKind::Class, lines(0, 100)),
            Symbol::new("X", SymbolKind::Function, lines(30, 40)),
        ]
    }

    #[tokio::test]
    async fn test_outline_cached_after_first_fetch() {
        let provider = Arc::new(FixedProvider::new(sample()));
        let index = SymbolIndex::new(provider.clone());
        let doc = Path::new("/tmp/a.cpp");

        let first = index.get_outline(doc).await;
        let second = index.get_outline(doc).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.roots().len(), 1, "outline is normalized");

        let stats = index.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_empty_outline_not_cached() {
        let provider = Arc::new(FixedProvider::new(Vec::new()));
        let index = SymbolIndex::new(provider.clone());
        let doc = Path::new("/tmp/empty.rs");

        assert!(index.get_outline(doc).await.is_empty());
        assert!(index.get_outline(doc).await.is_empty());
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
        assert!(index.cached(doc).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_and_failed_outlines_not_cached() {
        let none = SymbolIndex::new(Arc::new(FixedProvider::none()));
        assert!(none.get_outline(Path::new("/tmp/x.go")).await.is_empty());
        assert_eq!(none.stats().await.entries, 0);

        let failing = Arc::new(FixedProvider::failing());
        let index = SymbolIndex::new(failing.clone());
        assert!(index.get_outline(Path::new("/tmp/x.go")).await.is_empty());
        assert!(index.get_outline(Path::new("/tmp/x.go")).await.is_empty());
        assert_eq!(failing.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_drops_outline_and_session() {
        let provider = Arc::new(FixedProvider::new(sample()));
        let index = SymbolIndex::new(provider.clone());
        let doc = Path::new("/tmp/a.cpp");

        let outline = index.get_outline(doc).await;
        index
            .with_session(doc, &outline, |s| s.record_parent_move(vec![Some(SymbolPath::root(0))]))
            .await
            .unwrap();

        assert!(index.invalidate(doc).await);
        assert!(!index.invalidate(doc).await);

        let refreshed = index.get_outline(doc).await;
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
        let armed = index
            .with_session(doc, &refreshed, |s| s.is_armed())
            .await
            .unwrap();
        assert!(!armed, "new outline starts with an idle session");
    }

    #[tokio::test]
    async fn test_stale_outline_cannot_touch_new_session() {
        let index = SymbolIndex::new(Arc::new(FixedProvider::new(sample())));
        let doc = Path::new("/tmp/a.cpp");

        let stale = index.get_outline(doc).await;
        index.invalidate(doc).await;
        let _fresh = index.get_outline(doc).await;

        assert!(index.with_session(doc, &stale, |_| ()).await.is_none());
        assert!(index.with_current_session(doc, |_| ()).await.is_some());
    }

    #[tokio::test]
    async fn test_clear_keeps_stats() {
        let index = SymbolIndex::new(Arc::new(FixedProvider::new(sample())));
        index.get_outline(Path::new("/tmp/a.cpp")).await;
        index.get_outline(Path::new("/tmp/b.cpp")).await;
        index.clear().await;

        let stats = index.stats().await;
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.misses, 2);
    }
}
