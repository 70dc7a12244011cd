//! Outline command implementation
//!
//! Prints the containment-repaired symbol tree, or with `--raw` the tree
//! exactly as the provider returned it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::location::absolute_file;
use crate::cli::response::{OutlineResponse, SymbolOutput};
use crate::models::symbol::Symbol;

#[derive(Args, Debug)]
pub struct OutlineArgs {
    /// Source file
    pub file: PathBuf,

    /// Skip containment repair and show the provider's tree as-is
    #[arg(long)]
    pub raw: bool,
}

pub async fn execute(args: OutlineArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let file = absolute_file(&args.file)?;

    let (symbols, count) = if args.raw {
        let raw = app.provider().fetch_outline(&file).await?.unwrap_or_default();
        let count = raw.iter().map(Symbol::subtree_len).sum();
        (raw.iter().map(SymbolOutput::from).collect(), count)
    } else {
        let outline = app.navigator().outline(&file).await;
        (
            outline.roots().iter().map(SymbolOutput::from).collect(),
            outline.len(),
        )
    };

    ctx.print(&OutlineResponse {
        file: ctx.relative_path(&file),
        normalized: !args.raw,
        count,
        symbols,
    });
    Ok(())
}
