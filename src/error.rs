//! Error types for symnav
//!
//! Navigation itself never fails; these cover the outline providers,
//! configuration loading and file access around it.

use thiserror::Error;

use crate::models::symbol::Language;

pub type SymnavResult<T> = std::result::Result<T, SymnavError>;

#[derive(Debug, Error)]
pub enum SymnavError {
    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Failed to start server: {0}")]
    ServerStart(String),

    #[error("Server not connected")]
    NotConnected,

    #[error("No language server known for {0}. Configure one under [lsp.servers].")]
    UnsupportedLanguage(String),

    #[error("{language} language server terminated unexpectedly")]
    ServerTerminated { language: Language },

    #[error("{0}")]
    Timeout(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error [{code}]: {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("File too large ({size_mb}MB > {limit_mb}MB limit): {path}")]
    FileTooLarge {
        path: String,
        size_mb: u64,
        limit_mb: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LspError {
    const CANCELLED_ERROR_CODE: i32 = -32800;

    pub fn error_code(&self) -> i32 {
        match self {
            Self::ServerError { code, .. } => *code,
            Self::ServerTerminated { .. } => -32099,
            Self::Timeout(_) => -32001,
            Self::NotConnected => -32003,
            Self::RequestCancelled => Self::CANCELLED_ERROR_CODE,
            _ => -32000,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::RequestCancelled)
            || matches!(self, Self::ServerError { code, .. } if *code == Self::CANCELLED_ERROR_CODE)
    }

    /// A retry on the next navigation request may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ServerTerminated { .. }
                | Self::NotConnected
                | Self::Timeout(_)
                | Self::RequestCancelled
        ) || self.is_cancelled()
    }

    /// The client should be dropped and the server started again
    pub fn needs_restart(&self) -> bool {
        matches!(self, Self::ServerTerminated { .. } | Self::NotConnected)
    }
}

impl From<crate::infra::lsp::protocol::ResponseError> for LspError {
    fn from(err: crate::infra::lsp::protocol::ResponseError) -> Self {
        LspError::ServerError {
            code: err.code,
            message: err.message,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
