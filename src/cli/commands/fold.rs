//! Fold command implementation
//!
//! Lists the folding ranges to collapse so only definition signatures stay
//! visible.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::location::{absolute_file, parse_selection};
use crate::cli::response::FoldResponse;
use crate::models::lsp::Selection;
use crate::nav::{FoldOptions, plan_folds};

#[derive(Args, Debug)]
pub struct FoldArgs {
    /// Source file
    pub file: PathBuf,

    /// Also fold classes, enums, interfaces and structs
    #[arg(long)]
    pub types: bool,

    /// Also fold string symbols (Markdown headings)
    #[arg(long)]
    pub strings: bool,

    /// Keep definitions and comments at these positions open (line[:column] or a..b)
    #[arg(long, num_args = 1..)]
    pub except: Vec<String>,
}

pub async fn execute(args: FoldArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let file = absolute_file(&args.file)?;

    let selections = args
        .except
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<Selection>>>()?;

    let options = FoldOptions {
        fold_types: args.types,
        fold_current: selections.is_empty(),
        fold_strings: args.strings,
    };

    let outline = app.navigator().outline(&file).await;
    let folding_ranges = app.provider().folding_ranges(&file).await?;
    let lines = plan_folds(&outline, &folding_ranges, &selections, options);

    ctx.print(&FoldResponse {
        file: ctx.relative_path(&file),
        lines: lines.into_iter().map(|line| line + 1).collect(),
    });
    Ok(())
}
