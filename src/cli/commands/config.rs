//! Config command implementation

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::App;
use crate::cli::output::TextOutput;
use crate::models::config::SymnavConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default configuration file
    Init {
        /// Initialize global config (~/.config/symnav)
        #[arg(long)]
        global: bool,

        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration (files merged, env applied)
    Show,

    /// Show config file path
    Path {
        /// Show global config path
        #[arg(long)]
        global: bool,
    },
}

#[derive(Serialize)]
struct ConfigInitResponse {
    status: &'static str,
    path: String,
    level: &'static str,
}

impl TextOutput for ConfigInitResponse {
    fn to_text(&self) -> String {
        format!("Created {} config: {}", self.level, self.path)
    }
}

#[derive(Serialize)]
struct ConfigShowResponse {
    config: SymnavConfig,
}

impl TextOutput for ConfigShowResponse {
    fn to_text(&self) -> String {
        toml::to_string_pretty(&self.config)
            .unwrap_or_else(|e| format!("Failed to render config: {}", e))
    }
}

#[derive(Serialize)]
struct ConfigPathResponse {
    level: &'static str,
    path: String,
    exists: bool,
}

impl TextOutput for ConfigPathResponse {
    fn to_text(&self) -> String {
        let suffix = if self.exists { "" } else { " (missing)" };
        format!("{}{}", self.path, suffix)
    }
}

pub async fn execute(args: ConfigArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let display_path = |global: bool, path: &std::path::Path| {
        if global {
            path.display().to_string()
        } else {
            ctx.relative_path(path)
        }
    };

    match args.command {
        ConfigCommand::Init { global, force } => {
            let path = app.config_service.init(global, force).await?;
            ctx.print(&ConfigInitResponse {
                status: "created",
                path: display_path(global, &path),
                level: if global { "global" } else { "project" },
            });
        }

        ConfigCommand::Show => {
            ctx.print(&ConfigShowResponse {
                config: app.config().clone(),
            });
        }

        ConfigCommand::Path { global } => {
            let path = app.config_service.config_path(global);
            ctx.print(&ConfigPathResponse {
                level: if global { "global" } else { "project" },
                path: display_path(global, &path),
                exists: path.exists(),
            });
        }
    }

    Ok(())
}
