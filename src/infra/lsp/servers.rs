//! Language Server Configurations
//!
//! Default server command per language, overridable from `[lsp.servers]`.

use std::collections::HashMap;
use std::process::Command;

use crate::models::config::LspConfig;
use crate::models::symbol::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub install_hint: &'static str,
}

impl ServerConfig {
    fn builtin(command: &str, args: &[&str], install_hint: &'static str) -> Self {
        Self {
            name: command.to_string(),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            install_hint,
        }
    }

    pub fn is_installed(&self) -> bool {
        #[cfg(unix)]
        let finder = "which";
        #[cfg(windows)]
        let finder = "where";

        Command::new(finder)
            .arg(&self.command)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Built-in servers for every supported language
pub fn defaults() -> HashMap<Language, ServerConfig> {
    let mut configs = HashMap::new();

    configs.insert(
        Language::Rust,
        ServerConfig::builtin("rust-analyzer", &[], "rustup component add rust-analyzer"),
    );
    configs.insert(
        Language::Cpp,
        ServerConfig::builtin(
            "clangd",
            &["--background-index"],
            "Install clangd from https://clangd.llvm.org/installation",
        ),
    );
    configs.insert(
        Language::Go,
        ServerConfig::builtin("gopls", &[], "go install golang.org/x/tools/gopls@latest"),
    );
    configs.insert(
        Language::Java,
        ServerConfig::builtin(
            "jdtls",
            &[],
            "Download from https://download.eclipse.org/jdtls/snapshots/",
        ),
    );
    configs.insert(
        Language::Kotlin,
        ServerConfig::builtin(
            "kotlin-language-server",
            &[],
            "Download from https://github.com/fwcd/kotlin-language-server/releases",
        ),
    );
    configs.insert(
        Language::CSharp,
        ServerConfig::builtin("csharp-ls", &[], "dotnet tool install -g csharp-ls"),
    );

    let tsserver = ServerConfig::builtin(
        "typescript-language-server",
        &["--stdio"],
        "npm install -g typescript typescript-language-server",
    );
    configs.insert(Language::TypeScript, tsserver.clone());
    configs.insert(Language::JavaScript, tsserver);

    let mut pyright =
        ServerConfig::builtin("pyright-langserver", &["--stdio"], "npm install -g pyright");
    pyright.name = "pyright".to_string();
    configs.insert(Language::Python, pyright);

    configs.insert(
        Language::Lua,
        ServerConfig::builtin(
            "lua-language-server",
            &[],
            "Download from https://github.com/LuaLS/lua-language-server/releases",
        ),
    );
    configs.insert(
        Language::Markdown,
        ServerConfig::builtin(
            "marksman",
            &["server"],
            "Download from https://github.com/artempyanykh/marksman/releases",
        ),
    );

    configs
}

/// Built-in servers with user overrides applied
pub fn resolve(config: &LspConfig) -> HashMap<Language, ServerConfig> {
    let mut configs = defaults();

    for language in config.servers.keys() {
        let Some((command, args)) = config.server_command(*language) else {
            continue;
        };
        tracing::debug!("Using configured {} server: {}", language, command);
        configs.insert(
            *language,
            ServerConfig {
                name: command.clone(),
                command,
                args,
                install_hint: "Check the command configured under [lsp.servers]",
            },
        );
    }

    configs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_language_has_a_server() {
        let configs = defaults();
        for language in Language::all() {
            assert!(configs.contains_key(&language), "{} has no server", language);
        }
        assert!(!configs.contains_key(&Language::Unknown));
    }

    #[test]
    fn test_override_replaces_default() {
        let mut lsp = LspConfig::default();
        lsp.servers
            .insert(Language::Cpp, "clangd-18 --log=error".to_string());

        let configs = resolve(&lsp);
        let cpp = &configs[&Language::Cpp];
        assert_eq!(cpp.command, "clangd-18");
        assert_eq!(cpp.args, vec!["--log=error"]);
        assert_eq!(cpp.command_line(), "clangd-18 --log=error");

        assert_eq!(configs[&Language::Rust].command, "rust-analyzer");
    }

    #[test]
    fn test_blank_override_keeps_default() {
        let mut lsp = LspConfig::default();
        lsp.servers.insert(Language::Go, "   ".to_string());
        assert_eq!(resolve(&lsp)[&Language::Go].command, "gopls");
    }
}
