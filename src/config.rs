//! Global Configuration Singleton

use std::sync::OnceLock;
use std::time::Duration;

use crate::models::config::SymnavConfig;
use crate::models::symbol::Language;

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Startup cost of a language server relative to the base timeout
pub fn timeout_multiplier(language: Language) -> f64 {
    match language {
        // JDT.LS and kotlin-ls resolve the build graph before answering anything
        Language::Java | Language::Kotlin => 4.0,
        // Pyright / tsserver index the whole project on first request
        Language::Python | Language::TypeScript | Language::JavaScript => 2.5,
        // clangd: compile_commands.json parsing
        Language::Cpp | Language::CSharp => 1.5,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Request,
    Initialization,
    Shutdown,
}

impl OperationType {
    pub fn from_method(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialization,
            "shutdown" => Self::Shutdown,
            _ => Self::Request,
        }
    }

    fn base_multiplier(self) -> f64 {
        match self {
            Self::Request => 1.0,
            Self::Initialization => 2.0,
            Self::Shutdown => 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    base_timeout: Duration,
    pub max_file_size_bytes: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_timeout: Duration::from_secs(30),
            max_file_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl From<&SymnavConfig> for RuntimeConfig {
    fn from(config: &SymnavConfig) -> Self {
        Self {
            base_timeout: Duration::from_secs(config.lsp.timeout_secs),
            max_file_size_bytes: config.lsp.max_file_size_bytes(),
        }
    }
}

impl RuntimeConfig {
    pub fn timeout_for(&self, language: Language, method: &str) -> Duration {
        let op_type = OperationType::from_method(method);
        let multiplier = timeout_multiplier(language) * op_type.base_multiplier();
        Duration::from_secs_f64(self.base_timeout.as_secs_f64() * multiplier)
    }
}

pub fn init(config: &SymnavConfig) {
    let _ = CONFIG.set(RuntimeConfig::from(config));
}

pub fn timeout_for(language: Language, method: &str) -> Duration {
    config().timeout_for(language, method)
}

pub fn max_file_size_bytes() -> u64 {
    config().max_file_size_bytes
}

fn config() -> RuntimeConfig {
    CONFIG.get().cloned().unwrap_or_default()
}
