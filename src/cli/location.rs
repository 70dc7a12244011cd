//! Location parsing for CLI commands
//!
//! Lines and columns are 1-indexed on the command line and converted to
//! 0-indexed LSP positions at the edge.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::models::lsp::{Position, Selection};

#[derive(Debug, Clone)]
pub struct ParsedLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl ParsedLocation {
    /// Parse location string and convert to absolute path in one step
    pub fn parse_absolute(input: &str) -> Result<Self> {
        let parsed = Self::parse(input)?;
        Ok(Self {
            file: absolute_file(&parsed.file)?,
            ..parsed
        })
    }

    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Location cannot be empty");
        }

        let (file_part, rest) = split_path_and_position(input)?;
        let (line, column) = parse_line_column(rest)?;

        Ok(Self {
            file: PathBuf::from(file_part),
            line,
            column,
        })
    }

    pub fn position(&self) -> Position {
        Position::from_cli(self.line, self.column)
    }
}

impl std::fmt::Display for ParsedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Resolve a file argument against the working directory and canonicalize it
pub fn absolute_file(file: &Path) -> Result<PathBuf> {
    let joined = if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(file)
    };

    joined
        .canonicalize()
        .map_err(|_| anyhow::anyhow!("File not found: {}", joined.display()))
}

/// Parse `line[:column]` into a 0-indexed position
pub fn parse_position(input: &str) -> Result<Position> {
    let (line, column) = parse_line_column(input.trim())?;
    Ok(Position::from_cli(line, column))
}

/// Parse a caret (`line[:column]`) or a selection (`anchor..active`)
pub fn parse_selection(input: &str) -> Result<Selection> {
    match input.split_once("..") {
        Some((anchor, active)) => Ok(Selection::new(
            parse_position(anchor)?,
            parse_position(active)?,
        )),
        None => Ok(Selection::caret(parse_position(input)?)),
    }
}

fn split_path_and_position(input: &str) -> Result<(&str, &str)> {
    let is_windows = input.len() > 2
        && input.as_bytes().get(1) == Some(&b':')
        && input.as_bytes().first().is_some_and(|b| b.is_ascii_alphabetic());

    let search_start = if is_windows { 2 } else { 0 };

    // First ':' followed by a digit or '-' ends the path
    let split = input[search_start..]
        .char_indices()
        .filter(|(_, ch)| *ch == ':')
        .map(|(idx, _)| search_start + idx)
        .find_map(|pos| match input[pos + 1..].chars().next() {
            Some(c) if c.is_ascii_digit() => Some((pos, false)),
            Some('-') => Some((pos, true)),
            _ => None,
        });

    match split {
        None => bail!(
            "Invalid location format. Expected: file:line[:column]\nExample: src/main.rs:10:5"
        ),
        Some((_, true)) => bail!(
            "Invalid line number: negative values not allowed. Line numbers are 1-indexed positive integers.\nExample: src/main.rs:10:5"
        ),
        Some((pos, false)) => Ok((&input[..pos], &input[pos + 1..])),
    }
}

fn parse_line_column(rest: &str) -> Result<(u32, u32)> {
    let (line_str, column_str) = match rest.split_once(':') {
        Some((line, column)) => (line, Some(column)),
        None => (rest, None),
    };

    let line: u32 = line_str.parse().map_err(|_| {
        anyhow::anyhow!(
            "Invalid line number '{}': must be a positive integer (1-indexed)",
            line_str
        )
    })?;

    let column: u32 = match column_str {
        Some(col_str) => col_str.parse().map_err(|_| {
            anyhow::anyhow!(
                "Invalid column number '{}': must be a positive integer (1-indexed)",
                col_str
            )
        })?,
        None => 1,
    };

    if line == 0 {
        bail!("Line number must be >= 1 (got 0). Line numbers are 1-indexed.");
    }
    if column == 0 {
        bail!("Column number must be >= 1 (got 0). Column numbers are 1-indexed.");
    }

    Ok((line, column))
}
