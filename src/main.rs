//! symnav - Hierarchical symbol navigation CLI

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use symnav::app::{App, AppOptions};
use symnav::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Quiet by default so stdout stays machine-readable; RUST_LOG overrides
    let default_filter = if cli.verbose {
        "symnav=debug"
    } else {
        "symnav=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!(
                r#"{{"success":false,"error":"Failed to create runtime: {}"}}"#,
                e
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(async_main(cli)) {
        let response = symnav::cli::output::error_value(&format!("{:#}", e));
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, e))
        );
        std::process::exit(2);
    }
}

async fn async_main(cli: Cli) -> anyhow::Result<()> {
    let options = AppOptions {
        format: cli.format,
        outline_json: cli.outline_json,
    };
    let app = App::new(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;

    let result = execute_command(cli.command, &app).await;
    app.shutdown().await;
    result
}

async fn execute_command(command: Commands, app: &App) -> anyhow::Result<()> {
    use symnav::cli::commands;

    match command {
        Commands::Outline(args) => commands::outline::execute(args, app).await,
        Commands::Resolve(args) => commands::resolve::execute(args, app).await,
        Commands::Goto(args) => commands::goto::execute(args, app).await,
        Commands::Fold(args) => commands::fold::execute(args, app).await,
        Commands::Session(args) => commands::session::execute(args, app).await,
        Commands::Config(args) => commands::config::execute(args, app).await,
    }
}
