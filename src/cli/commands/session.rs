//! Session command implementation
//!
//! Long-lived navigation over one editor. Commands arrive on stdin as JSON,
//! one per line, and each gets exactly one JSON line back. Unlike `goto`,
//! the return-child stack and highlights survive between commands, so a
//! `parent` followed by `child` comes back to where it started.
//!
//! ```text
//! {"command":"select","positions":["12:5"]}
//! {"command":"goto","direction":"parent"}
//! {"command":"goto","direction":"child","select":true}
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::App;
use crate::cli::location::{absolute_file, parse_selection};
use crate::cli::response::{GotoResponse, NearestResponse, RangeOutput, StatsResponse};
use crate::models::lsp::{Position, Selection};
use crate::nav::{Direction, HighlightUpdate, resolve};

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Document the editor starts on
    pub file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum SessionCommand {
    Goto {
        direction: Direction,
        #[serde(default)]
        select: bool,
    },
    /// The host reports a selection change
    Select { positions: Vec<String> },
    Resolve,
    /// The document text changed
    Edit,
    Close,
    /// Another document became active
    Focus { file: PathBuf },
    Stats,
}

#[derive(Debug, Serialize)]
struct HighlightResponse {
    highlights: &'static str,
    ranges: Vec<RangeOutput>,
}

impl From<HighlightUpdate> for HighlightResponse {
    fn from(update: HighlightUpdate) -> Self {
        match update {
            HighlightUpdate::Reapply(ranges) => Self {
                highlights: "reapply",
                ranges: ranges.into_iter().map(RangeOutput::from).collect(),
            },
            HighlightUpdate::Clear => Self {
                highlights: "clear",
                ranges: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct DocumentResponse {
    file: String,
    event: &'static str,
}

/// Editor state the session tracks between commands
struct EditorState {
    document: PathBuf,
    selections: Vec<Selection>,
}

impl EditorState {
    fn open(document: PathBuf) -> Self {
        Self {
            document,
            selections: vec![Selection::caret(Position::default())],
        }
    }
}

pub async fn execute(args: SessionArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let mut state = EditorState::open(absolute_file(&args.file)?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match serde_json::from_str::<SessionCommand>(&line) {
            Ok(command) => command,
            Err(e) => {
                ctx.print_error_line(&format!("Invalid command: {}", e));
                continue;
            }
        };

        if let Err(e) = handle(command, &mut state, app).await {
            ctx.print_error_line(&e.to_string());
        }
    }

    Ok(())
}

async fn handle(command: SessionCommand, state: &mut EditorState, app: &App) -> Result<()> {
    let ctx = &app.output;
    let navigator = app.navigator();
    let file = ctx.relative_path(&state.document);

    match command {
        SessionCommand::Goto { direction, select } => {
            let outcome = navigator
                .navigate(&state.document, &state.selections, direction, select)
                .await;
            state.selections = outcome.selections.clone();
            ctx.print_line(&GotoResponse::new(file, direction, &outcome));
        }
        SessionCommand::Select { positions } => {
            let selections = positions
                .iter()
                .map(|p| parse_selection(p))
                .collect::<Result<Vec<_>>>()?;
            let update = navigator
                .selection_changed(&state.document, &selections)
                .await;
            state.selections = selections;
            ctx.print_line(&HighlightResponse::from(update));
        }
        SessionCommand::Resolve => {
            let position = state
                .selections
                .first()
                .map(Selection::start)
                .unwrap_or_default();
            let outline = navigator.outline(&state.document).await;
            ctx.print_line(&NearestResponse::new(
                file,
                position,
                &resolve(&outline, position),
            ));
        }
        SessionCommand::Edit => {
            navigator.document_edited(&state.document).await;
            ctx.print_line(&DocumentResponse {
                file,
                event: "edited",
            });
        }
        SessionCommand::Close => {
            navigator.document_closed(&state.document).await;
            ctx.print_line(&DocumentResponse {
                file,
                event: "closed",
            });
        }
        SessionCommand::Focus { file: next } => {
            let next = absolute_file(&next)?;
            navigator.active_editor_changed(Some(&state.document)).await;
            *state = EditorState::open(next);
            ctx.print_line(&DocumentResponse {
                file: ctx.relative_path(&state.document),
                event: "focused",
            });
        }
        SessionCommand::Stats => {
            let stats = navigator.index().stats().await;
            ctx.print_line(&StatsResponse::from(stats));
        }
    }

    Ok(())
}
