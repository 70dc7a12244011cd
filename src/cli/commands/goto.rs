//! Goto command implementation
//!
//! One navigation step from one or more cursors in the same file.

use anyhow::{Result, bail};
use clap::Args;

use crate::app::App;
use crate::cli::ParsedLocation;
use crate::cli::response::GotoResponse;
use crate::models::lsp::Selection;
use crate::nav::Direction;

#[derive(Args, Debug)]
pub struct GotoArgs {
    /// prev, next, parent or child
    pub direction: Direction,

    /// Cursor positions (file:line[:column]); several for multi-cursor
    #[arg(required = true, num_args = 1..)]
    pub locations: Vec<String>,

    /// Select the target symbol instead of moving the cursor to it
    #[arg(short, long)]
    pub select: bool,
}

pub async fn execute(args: GotoArgs, app: &App) -> Result<()> {
    let ctx = &app.output;

    let locations = args
        .locations
        .iter()
        .map(|l| ParsedLocation::parse_absolute(l))
        .collect::<Result<Vec<_>>>()?;

    let Some(file) = locations.first().map(|l| l.file.clone()) else {
        bail!("At least one location is required");
    };
    if let Some(other) = locations.iter().find(|l| l.file != file) {
        bail!(
            "All cursors must be in the same file: {} vs {}",
            file.display(),
            other.file.display()
        );
    }

    let selections: Vec<Selection> = locations
        .iter()
        .map(|l| Selection::caret(l.position()))
        .collect();

    let outcome = app
        .navigator()
        .navigate(&file, &selections, args.direction, args.select)
        .await;

    ctx.print(&GotoResponse::new(
        ctx.relative_path(&file),
        args.direction,
        &outcome,
    ));
    Ok(())
}
