//! LSP Server Manager
//!
//! One lazily started server per language, shared by every document of that
//! language.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Notify, RwLock};

use super::client::LspClient;
use super::servers::{self, ServerConfig};
use crate::error::LspError;
use crate::models::config::LspConfig;
use crate::models::symbol::Language;

enum ClientState {
    Starting(Arc<Notify>),
    Ready(Arc<LspClient>),
}

impl ClientState {
    fn client(&self) -> Option<Arc<LspClient>> {
        match self {
            Self::Ready(client) => Some(Arc::clone(client)),
            Self::Starting(_) => None,
        }
    }
}

pub struct LspManager {
    root: PathBuf,
    clients: RwLock<HashMap<Language, ClientState>>,
    configs: HashMap<Language, ServerConfig>,
}

impl LspManager {
    pub fn new(root: PathBuf, config: &LspConfig) -> Self {
        Self {
            root,
            clients: RwLock::new(HashMap::new()),
            configs: servers::resolve(config),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self, language: Language) -> Option<&ServerConfig> {
        self.configs.get(&language)
    }

    /// Get or start the client for a language
    ///
    /// Concurrent callers for the same language wait on the first start
    /// instead of spawning a second server.
    pub async fn get_client(&self, language: Language) -> Result<Arc<LspClient>, LspError> {
        loop {
            let (ready, starting) = {
                let clients = self.clients.read().await;
                match clients.get(&language) {
                    Some(ClientState::Ready(client)) => (Some(Arc::clone(client)), None),
                    Some(ClientState::Starting(notify)) => (None, Some(Arc::clone(notify))),
                    None => (None, None),
                }
            };

            if let Some(client) = ready {
                if client.is_running().await {
                    return Ok(client);
                }
                tracing::warn!("{} language server is no longer running", language);
                self.clients.write().await.remove(&language);
                continue;
            }

            if let Some(notify) = starting {
                notify.notified().await;
                continue;
            }

            let notify = Arc::new(Notify::new());
            {
                let mut clients = self.clients.write().await;
                if clients.contains_key(&language) {
                    continue;
                }
                clients.insert(language, ClientState::Starting(Arc::clone(&notify)));
            }

            let result = self.start_client(language).await;

            {
                let mut clients = self.clients.write().await;
                match &result {
                    Ok(client) => {
                        clients.insert(language, ClientState::Ready(Arc::clone(client)));
                    }
                    Err(_) => {
                        clients.remove(&language);
                    }
                }
            }
            notify.notify_waiters();

            return result;
        }
    }

    async fn start_client(&self, language: Language) -> Result<Arc<LspClient>, LspError> {
        let config = self
            .configs
            .get(&language)
            .ok_or_else(|| LspError::UnsupportedLanguage(language.to_string()))?;

        if !config.is_installed() {
            return Err(LspError::ServerStart(format!(
                "{} is not installed. Install: {}",
                config.name, config.install_hint
            )));
        }

        tracing::debug!("Launching {} server: {}", language, config.command_line());
        let client = LspClient::new(language, self.root.clone());
        client.start(&config.command, &config.args).await?;
        Ok(client)
    }

    /// Run `op` against the language's client, restarting the server once if it died
    pub async fn with_client<F, T, Fut>(&self, language: Language, op: F) -> Result<T, LspError>
    where
        F: Fn(Arc<LspClient>) -> Fut,
        Fut: Future<Output = Result<T, LspError>>,
    {
        let client = self.get_client(language).await?;
        match op(client).await {
            Err(e) if e.needs_restart() => {
                tracing::warn!("{} server error, restarting: {}", language, e);
                self.shutdown_client(language).await;
                let client = self.get_client(language).await?;
                op(client).await
            }
            other => other,
        }
    }

    /// Running client for a language, without starting one
    pub async fn existing_client(&self, language: Language) -> Option<Arc<LspClient>> {
        self.clients
            .read()
            .await
            .get(&language)
            .and_then(ClientState::client)
    }

    pub async fn shutdown_client(&self, language: Language) {
        let client = self
            .clients
            .write()
            .await
            .remove(&language)
            .and_then(|s| s.client());

        if let Some(client) = client
            && let Err(e) = client.shutdown().await
        {
            tracing::warn!("Error shutting down {} server: {}", language, e);
        }
    }

    pub async fn shutdown_all(&self) {
        let clients: Vec<Arc<LspClient>> = self
            .clients
            .write()
            .await
            .drain()
            .filter_map(|(_, state)| state.client())
            .collect();

        let results = futures::future::join_all(clients.iter().map(|c| c.shutdown())).await;
        for (client, result) in clients.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!("Error shutting down {} server: {}", client.language(), e);
            }
        }
    }

    pub async fn running_languages(&self) -> Vec<Language> {
        let candidates: Vec<(Language, Arc<LspClient>)> = {
            let clients = self.clients.read().await;
            clients
                .iter()
                .filter_map(|(lang, state)| state.client().map(|c| (*lang, c)))
                .collect()
        };

        let mut running = Vec::new();
        for (lang, client) in candidates {
            if client.is_running().await {
                running.push(lang);
            }
        }
        running
    }
}
