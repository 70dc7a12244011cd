//! CLI module for symnav
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod location;
pub mod output;
pub mod response;

pub use location::ParsedLocation;
pub use output::{OutputContext, OutputFormat};

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    config::ConfigArgs, fold::FoldArgs, goto::GotoArgs, outline::OutlineArgs,
    resolve::ResolveArgs, session::SessionArgs,
};

const LONG_ABOUT: &str = r#"
symnav - Hierarchical symbol navigation over language-server outlines

Moves a cursor between the symbols of a document: to the previous or next
sibling, out to the enclosing symbol, or into a child. Outlines come from the
file's language server (or a recorded documentSymbol response via
--outline-json) and are repaired when servers report a flat or partly nested
tree. Forward declarations are skipped.

EXAMPLES:
  symnav outline src/widget.cpp
  symnav resolve src/widget.cpp:42:3
  symnav goto next src/widget.cpp:42:3
  symnav goto parent src/widget.cpp:42:3 src/widget.cpp:80 --select
  symnav fold src/widget.cpp --except 42
  echo '{"command":"goto","direction":"parent"}' | symnav session src/widget.cpp
"#;

/// symnav - Hierarchical symbol navigation over language-server outlines
#[derive(Parser, Debug)]
#[command(name = "symnav")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'symnav <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (default from config: output.format)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read outlines from a recorded documentSymbol response instead of a language server
    #[arg(long, global = true, value_name = "FILE")]
    pub outline_json: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the symbol outline of a file
    Outline(OutlineArgs),

    /// Show the nearest symbols around a position
    Resolve(ResolveArgs),

    /// Move to the previous/next sibling, the parent or a child symbol
    Goto(GotoArgs),

    /// List folding ranges that collapse definitions
    Fold(FoldArgs),

    /// Interactive navigation driven by JSON commands on stdin
    Session(SessionArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Direction;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_goto_with_multiple_cursors() {
        let cli = Cli::parse_from([
            "symnav", "goto", "prev", "a.rs:3", "a.rs:9:2", "--select", "--format", "text",
        ]);
        assert_eq!(cli.format, Some(OutputFormat::Text));
        match cli.command {
            Commands::Goto(args) => {
                assert_eq!(args.direction, Direction::Previous);
                assert_eq!(args.locations.len(), 2);
                assert!(args.select);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_fold_except() {
        let cli = Cli::parse_from([
            "symnav",
            "--outline-json",
            "outline.json",
            "fold",
            "a.cpp",
            "--types",
            "--except",
            "10",
            "20:4",
        ]);
        assert_eq!(cli.outline_json, Some(PathBuf::from("outline.json")));
        match cli.command {
            Commands::Fold(args) => {
                assert!(args.types);
                assert!(!args.strings);
                assert_eq!(args.except, vec!["10", "20:4"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        assert!(Cli::try_parse_from(["symnav", "goto", "sideways", "a.rs:1"]).is_err());
    }
}
