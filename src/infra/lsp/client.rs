use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::time::timeout;

use super::protocol::{
    ClientCapabilities, ClientInfo, InitializeParams, InitializeResult, LspSymbolKind, Message,
    Notification, Request, RequestId, Response, ResponseError, TextDocumentClientCapabilities,
    error_codes,
};
use super::transport::{Transport, write_notification, write_request, write_response};
use crate::error::LspError;
use crate::models::lsp::path_to_uri;
use crate::models::symbol::Language;

type PendingRequest = oneshot::Sender<Response>;

const SHUTDOWN_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
const EXIT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// Open document as last sent to the server
#[derive(Debug)]
struct DocumentState {
    version: u32,
    content_hash: u64,
}

impl DocumentState {
    fn new(content: &str) -> Self {
        Self {
            version: 1,
            content_hash: crate::infra::hash_content(content),
        }
    }

    /// Bump the version if `content` differs from what the server has
    fn update(&mut self, content: &str) -> bool {
        let hash = crate::infra::hash_content(content);
        if hash == self.content_hash {
            return false;
        }
        self.version += 1;
        self.content_hash = hash;
        true
    }
}

pub struct LspClient {
    language: Language,
    root: PathBuf,
    process: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    next_id: AtomicU64,
    pending: RwLock<HashMap<RequestId, PendingRequest>>,
    documents: RwLock<HashMap<String, DocumentState>>,
    capabilities: RwLock<Option<InitializeResult>>,
    shutdown: AtomicBool,
    terminated: AtomicBool,
}

impl LspClient {
    pub fn new(language: Language, root: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            language,
            root,
            process: Mutex::new(None),
            stdin: Mutex::new(None),
            next_id: AtomicU64::new(1),
            pending: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            capabilities: RwLock::new(None),
            shutdown: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        })
    }

    /// Spawn the server process and run the initialize handshake
    pub async fn start(self: &Arc<Self>, command: &str, args: &[String]) -> Result<(), LspError> {
        if self.is_running().await {
            return Ok(());
        }

        tracing::info!(
            "Starting {} language server: {} {:?}",
            self.language,
            command,
            args
        );

        let mut child = Command::new(command)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LspError::ServerStart(format!("{}: {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdin".to_string()))?;
        let stdout: ChildStdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdout".to_string()))?;
        let stderr = child.stderr.take();

        *self.process.lock().await = Some(child);
        *self.stdin.lock().await = Some(stdin);

        let client = Arc::clone(self);
        tokio::spawn(async move {
            client.read_responses(Transport::new(stdout)).await;
        });

        if let Some(stderr) = stderr {
            tokio::spawn(drain_stderr(self.language, stderr));
        }

        self.initialize().await?;

        tracing::info!("{} language server started", self.language);
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        let mut process = self.process.lock().await;
        match process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn initialize(&self) -> Result<(), LspError> {
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: Some(path_to_uri(&self.root)),
            capabilities: Self::client_capabilities(),
            client_info: Some(ClientInfo {
                name: "symnav".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        };

        let result: InitializeResult = self
            .request("initialize", Some(serde_json::to_value(params)?))
            .await?;

        if let Some(info) = &result.server_info {
            tracing::debug!(
                "{} server reports {} {}",
                self.language,
                info.name,
                info.version.as_deref().unwrap_or("")
            );
        }
        if !result.capabilities.supports_document_symbols() {
            tracing::warn!(
                "{} language server does not advertise documentSymbol support",
                self.language
            );
        }
        *self.capabilities.write().await = Some(result);

        self.notify("initialized", Some(serde_json::json!({})))
            .await
    }

    fn client_capabilities() -> ClientCapabilities {
        let text_document = TextDocumentClientCapabilities {
            synchronization: Some(serde_json::json!({
                "dynamicRegistration": false,
                "didSave": false
            })),
            document_symbol: Some(serde_json::json!({
                "symbolKind": {
                    "valueSet": LspSymbolKind::ALL
                },
                "hierarchicalDocumentSymbolSupport": true
            })),
            folding_range: Some(serde_json::json!({
                "lineFoldingOnly": true,
                "foldingRangeKind": {
                    "valueSet": ["comment", "imports", "region"]
                }
            })),
        };

        ClientCapabilities {
            window: Some(serde_json::json!({ "workDoneProgress": false })),
            text_document: Some(text_document),
            workspace: Some(serde_json::json!({ "configuration": true })),
        }
    }

    /// Send a request and wait for its response, bounded by the per-method timeout
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, LspError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(LspError::ServerTerminated {
                language: self.language,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(RequestId::Number(id), tx);

        let request = Request::new(id, method, params);
        tracing::trace!("{} LSP request {}: {}", self.language, id, method);

        let sent = {
            let mut stdin_guard = self.stdin.lock().await;
            match stdin_guard.as_mut() {
                Some(stdin) => write_request(stdin, &request).await.map_err(LspError::from),
                None => Err(LspError::NotConnected),
            }
        };
        if let Err(e) = sent {
            self.pending.write().await.remove(&RequestId::Number(id));
            return Err(e);
        }

        match timeout(crate::config::timeout_for(self.language, method), rx).await {
            Ok(Ok(response)) => match response.into_result() {
                Ok(result) => {
                    serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))
                }
                Err(err) if err.code == error_codes::SERVER_TERMINATED => {
                    Err(LspError::ServerTerminated {
                        language: self.language,
                    })
                }
                Err(err) => Err(err.into()),
            },
            Ok(Err(_)) => Err(LspError::RequestCancelled),
            Err(_) => {
                self.cancel_request(id).await;
                Err(LspError::Timeout(format!(
                    "{} '{}' timed out. The language server may be busy or unresponsive",
                    self.language, method
                )))
            }
        }
    }

    async fn cancel_request(&self, id: u64) {
        self.pending.write().await.remove(&RequestId::Number(id));
        let _ = self
            .notify("$/cancelRequest", Some(serde_json::json!({ "id": id })))
            .await;
    }

    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), LspError> {
        let notification = Notification::new(method, params);

        let mut stdin_guard = self.stdin.lock().await;
        let stdin = stdin_guard.as_mut().ok_or(LspError::NotConnected)?;
        write_notification(stdin, &notification).await?;

        Ok(())
    }

    async fn read_responses(self: Arc<Self>, mut transport: Transport<ChildStdout>) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match transport.read_message().await {
                Ok(message) => self.handle_message(message).await,
                Err(e) => {
                    if !self.shutdown.load(Ordering::Acquire) {
                        tracing::error!("{} LSP read error: {}", self.language, e);
                        self.fail_pending(
                            error_codes::SERVER_TERMINATED,
                            &format!("{} language server terminated unexpectedly", self.language),
                        )
                        .await;
                        self.terminated.store(true, Ordering::Release);
                    }
                    break;
                }
            }
        }
    }

    /// Resolve every in-flight request with an error response
    async fn fail_pending(&self, code: i32, reason: &str) {
        let mut pending = self.pending.write().await;
        if pending.is_empty() {
            return;
        }
        tracing::debug!("Cancelling {} pending requests: {}", pending.len(), reason);
        for (id, sender) in pending.drain() {
            let _ = sender.send(Response::failure(id, ResponseError::new(code, reason)));
        }
    }

    async fn handle_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let Some(id) = response.id.clone() else {
                    return;
                };
                let mut pending = self.pending.write().await;
                // Some servers echo numeric ids back as strings
                let sender = pending.remove(&id).or_else(|| match &id {
                    RequestId::String(s) => s
                        .parse::<u64>()
                        .ok()
                        .and_then(|n| pending.remove(&RequestId::Number(n))),
                    RequestId::Number(_) => None,
                });
                match sender {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::debug!(
                        "Received response for unknown request ID {:?} (may have timed out)",
                        id
                    ),
                }
            }
            Message::Request(request) => self.handle_server_request(request).await,
            Message::Notification(notification) => {
                let params = notification.params.unwrap_or(Value::Null);
                match notification.method.as_str() {
                    "window/logMessage" | "window/showMessage" => {
                        if let Some(msg) = params.get("message").and_then(|m| m.as_str()) {
                            let msg_type = params.get("type").and_then(|t| t.as_u64());
                            match classify_log_level(msg, msg_type) {
                                LogLevel::Error => {
                                    tracing::error!("LSP {}: {}", self.language, msg)
                                }
                                LogLevel::Warn => tracing::warn!("LSP {}: {}", self.language, msg),
                                LogLevel::Info => tracing::info!("LSP {}: {}", self.language, msg),
                                LogLevel::Debug => {
                                    tracing::debug!("LSP {}: {}", self.language, msg)
                                }
                            }
                        }
                    }
                    method => tracing::trace!("Unhandled notification: {}", method),
                }
            }
        }
    }

    /// Shutdown with 3-stage graceful termination
    pub async fn shutdown(&self) -> Result<(), LspError> {
        self.shutdown.store(true, Ordering::Release);

        // Stage 1: polite shutdown/exit
        let polite = timeout(SHUTDOWN_REQUEST_TIMEOUT, async {
            if let Ok(()) = self.request::<()>("shutdown", None).await {
                let _ = self.notify("exit", None).await;
            }
        })
        .await;
        if polite.is_err() {
            tracing::debug!("{} LSP shutdown request timed out", self.language);
        }

        // Closing stdin signals EOF
        self.stdin.lock().await.take();

        // Stage 2 & 3: wait for exit, then kill
        if let Some(mut child) = self.process.lock().await.take() {
            match timeout(EXIT_WAIT_TIMEOUT, child.wait()).await {
                Ok(Ok(status)) => {
                    tracing::debug!("{} language server exited: {:?}", self.language, status);
                }
                Ok(Err(e)) => {
                    tracing::warn!("{} language server wait error: {}", self.language, e);
                }
                Err(_) => {
                    tracing::warn!(
                        "{} language server termination timed out, forcing kill",
                        self.language
                    );
                    let _ = child.kill().await;
                }
            }
        }

        self.fail_pending(error_codes::REQUEST_CANCELLED, "Server shutdown")
            .await;
        tracing::info!("{} language server stopped", self.language);
        Ok(())
    }

    /// Send didOpen, or didChange when the content differs from the last sync
    pub async fn sync_document(&self, uri: &str, content: &str) -> Result<(), LspError> {
        let mut documents = self.documents.write().await;

        if let Some(state) = documents.get_mut(uri) {
            if state.update(content) {
                self.notify(
                    "textDocument/didChange",
                    Some(serde_json::json!({
                        "textDocument": { "uri": uri, "version": state.version },
                        "contentChanges": [{ "text": content }]
                    })),
                )
                .await?;
            }
            return Ok(());
        }

        let state = DocumentState::new(content);
        self.notify(
            "textDocument/didOpen",
            Some(serde_json::json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": self.language.lsp_id(),
                    "version": state.version,
                    "text": content
                }
            })),
        )
        .await?;
        documents.insert(uri.to_string(), state);
        Ok(())
    }

    /// Send didClose if the document was opened through this client
    pub async fn close_document(&self, uri: &str) -> Result<(), LspError> {
        if self.documents.write().await.remove(uri).is_none() {
            return Ok(());
        }
        self.notify(
            "textDocument/didClose",
            Some(serde_json::json!({ "textDocument": { "uri": uri } })),
        )
        .await
    }

    async fn handle_server_request(&self, request: Request) {
        let response = match request.method.as_str() {
            "workspace/configuration" => Response::success(
                request.id,
                workspace_configuration_reply(request.params.as_ref()),
            ),
            "client/registerCapability"
            | "client/unregisterCapability"
            | "window/workDoneProgress/create" => Response::success(request.id, Value::Null),
            method => {
                tracing::debug!("Unhandled server request: {}", method);
                Response::failure(
                    request.id,
                    ResponseError::new(
                        error_codes::METHOD_NOT_FOUND,
                        format!("Method not found: {}", method),
                    ),
                )
            }
        };

        let mut stdin_guard = self.stdin.lock().await;
        if let Some(stdin) = stdin_guard.as_mut()
            && let Err(e) = write_response(stdin, &response).await
        {
            tracing::debug!("{} failed to answer server request: {}", self.language, e);
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn supports_folding_ranges(&self) -> bool {
        self.capabilities
            .read()
            .await
            .as_ref()
            .is_some_and(|r| r.capabilities.supports_folding_ranges())
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        if let Ok(mut process_guard) = self.process.try_lock() {
            if let Some(child) = process_guard.as_mut() {
                let _ = child.start_kill();
                tracing::debug!("LspClient for {} dropped, process killed", self.language);
            }
        } else {
            tracing::warn!(
                "LspClient for {} dropped but could not acquire lock - potential zombie process",
                self.language
            );
        }
    }
}

async fn drain_stderr(language: Language, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::trace!("{} stderr: {}", language, line);
    }
}

/// One empty settings object per requested item
fn workspace_configuration_reply(params: Option<&Value>) -> Value {
    let items = params
        .and_then(|p| p.get("items"))
        .and_then(|i| i.as_array())
        .map_or(0, |arr| arr.len());

    Value::Array(vec![Value::Object(serde_json::Map::new()); items])
}

/// LSP MessageType: 1=Error, 2=Warning, 3=Info, 4=Log
fn classify_log_level(message: &str, msg_type: Option<u64>) -> LogLevel {
    match msg_type {
        Some(1) => LogLevel::Error,
        Some(2) => LogLevel::Warn,
        Some(3) => LogLevel::Info,
        Some(_) => LogLevel::Debug,
        None => {
            let lower = message.to_lowercase();
            if lower.contains("error") || lower.contains("exception") {
                LogLevel::Error
            } else if lower.contains("warn") {
                LogLevel::Warn
            } else {
                LogLevel::Debug
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_state_versions_on_change_only() {
        let mut state = DocumentState::new("fn main() {}");
        assert_eq!(state.version, 1);

        assert!(!state.update("fn main() {}"));
        assert_eq!(state.version, 1);

        assert!(state.update("fn main() { run(); }"));
        assert_eq!(state.version, 2);
    }

    #[test]
    fn test_workspace_configuration_reply() {
        let params = serde_json::json!({
            "items": [{ "section": "clangd" }, { "section": "files" }]
        });
        let reply = workspace_configuration_reply(Some(&params));
        assert_eq!(reply, serde_json::json!([{}, {}]));
        assert_eq!(workspace_configuration_reply(None), serde_json::json!([]));
    }

    #[test]
    fn test_log_level_classification() {
        assert_eq!(classify_log_level("anything", Some(1)), LogLevel::Error);
        assert_eq!(classify_log_level("anything", Some(3)), LogLevel::Info);
        assert_eq!(classify_log_level("indexing", Some(4)), LogLevel::Debug);
        assert_eq!(classify_log_level("Fatal exception", None), LogLevel::Error);
        assert_eq!(classify_log_level("warning: stale", None), LogLevel::Warn);
        assert_eq!(classify_log_level("ready", None), LogLevel::Debug);
    }

    #[tokio::test]
    async fn test_failed_send_leaves_no_pending_request() {
        let client = LspClient::new(Language::Go, std::env::temp_dir());
        let result = client.request::<Value>("textDocument/documentSymbol", None).await;
        assert!(matches!(result, Err(LspError::NotConnected)));
        assert!(client.pending.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_unstarted_client_is_not_running() {
        let client = LspClient::new(Language::Rust, std::env::temp_dir());
        assert!(!client.is_running().await);
        assert!(!client.supports_folding_ranges().await);

        let err = client.notify("initialized", None).await.unwrap_err();
        assert!(matches!(err, LspError::NotConnected));

        // Closing an unknown document is a no-op
        client.close_document("file:///nope.rs").await.unwrap();
    }
}
