//! Configuration model for symnav
//!
//! Language server commands, navigation policy and output settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::symbol::Language;

/// symnav configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SymnavConfig {
    #[serde(default)]
    pub lsp: LspConfig,

    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// LSP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspConfig {
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Files larger than this are not sent to the server (0 = unlimited)
    #[serde(default = "defaults::max_file_size_mb")]
    pub max_file_size_mb: u32,

    /// Per-language server command line overrides, e.g. `cpp = "clangd --background-index"`
    #[serde(default)]
    pub servers: HashMap<Language, String>,
}

impl Default for LspConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::timeout_secs(),
            max_file_size_mb: defaults::max_file_size_mb(),
            servers: HashMap::new(),
        }
    }
}

impl LspConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        if self.max_file_size_mb == 0 {
            u64::MAX
        } else {
            self.max_file_size_mb as u64 * 1024 * 1024
        }
    }

    /// Split a configured command line into program and arguments
    pub fn server_command(&self, language: Language) -> Option<(String, Vec<String>)> {
        let line = self.servers.get(&language)?;
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

/// Navigation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Land on the current symbol when the requested direction has no target
    #[serde(default = "defaults::fallback_to_current")]
    pub fallback_to_current: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            fallback_to_current: defaults::fallback_to_current(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: defaults::format(),
        }
    }
}

mod defaults {
    // LSP
    pub fn timeout_secs() -> u64 {
        30
    }
    pub fn max_file_size_mb() -> u32 {
        10
    }

    // Navigation
    pub fn fallback_to_current() -> bool {
        true
    }

    // Output
    pub fn format() -> String {
        "json".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SymnavConfig::default();
        assert_eq!(config.lsp.timeout_secs, 30);
        assert_eq!(config.lsp.max_file_size_mb, 10);
        assert!(config.navigation.fallback_to_current);
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SymnavConfig = toml::from_str(
            r#"
            [lsp.servers]
            cpp = "clangd --background-index --header-insertion=never"

            [navigation]
            fallback_to_current = false
            "#,
        )
        .unwrap();

        assert!(!config.navigation.fallback_to_current);
        assert_eq!(config.lsp.timeout_secs, 30);

        let (program, args) = config.lsp.server_command(Language::Cpp).unwrap();
        assert_eq!(program, "clangd");
        assert_eq!(
            args,
            vec!["--background-index", "--header-insertion=never"]
        );
        assert!(config.lsp.server_command(Language::Rust).is_none());
    }

    #[test]
    fn test_unlimited_file_size() {
        let lsp = LspConfig {
            max_file_size_mb: 0,
            ..LspConfig::default()
        };
        assert_eq!(lsp.max_file_size_bytes(), u64::MAX);
        assert_eq!(LspConfig::default().max_file_size_bytes(), 10 * 1024 * 1024);
    }
}
