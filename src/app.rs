//! Application container for symnav

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::{OutputContext, OutputFormat};
use crate::config;
use crate::models::config::SymnavConfig;
use crate::nav::{NavigationPolicy, Navigator, SymbolIndex};
use crate::services::config::{ConfigService, DefaultConfigService};
use crate::services::outline::{JsonOutlineProvider, LspOutlineProvider, OutlineProvider};

/// Startup options taken from global CLI flags
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub format: Option<OutputFormat>,
    pub outline_json: Option<PathBuf>,
}

pub struct App {
    root: PathBuf,
    pub(crate) output: OutputContext,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) config: SymnavConfig,
    pub(crate) navigator: Arc<Navigator>,
}

impl App {
    pub async fn new(options: AppOptions) -> anyhow::Result<Self> {
        let root = std::env::current_dir()?;
        tracing::debug!("Initializing symnav at {:?}", root);

        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = config_service.load().await.unwrap_or_else(|e| {
            tracing::warn!("Ignoring configuration: {}", e);
            SymnavConfig::default()
        });
        config::init(&config);

        let format = match options.format {
            Some(format) => format,
            None => config
                .output
                .format
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?,
        };
        let output = OutputContext::new(root.clone(), format);

        let provider: Arc<dyn OutlineProvider> = match options.outline_json {
            Some(path) => {
                tracing::info!("Reading outlines from {}", path.display());
                Arc::new(JsonOutlineProvider::new(path))
            }
            None => Arc::new(LspOutlineProvider::new(&root, &config.lsp)),
        };

        let policy = NavigationPolicy {
            fallback_to_current: config.navigation.fallback_to_current,
        };
        let navigator = Arc::new(Navigator::new(
            Arc::new(SymbolIndex::new(provider)),
            policy,
        ));

        Ok(Self {
            root,
            output,
            config_service,
            config,
            navigator,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SymnavConfig {
        &self.config
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn provider(&self) -> &Arc<dyn OutlineProvider> {
        self.navigator.index().provider()
    }

    /// Stop any language servers started for this run
    pub async fn shutdown(&self) {
        self.provider().shutdown().await;
    }
}
