//! Output formatting for CLI commands

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("Unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Human-readable rendering for `--format text`
pub trait TextOutput {
    fn to_text(&self) -> String;
}

/// Output context for consistent formatting across commands
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Project root for relative path calculation
    root: PathBuf,
    format: OutputFormat,
}

impl OutputContext {
    pub fn new(root: PathBuf, format: OutputFormat) -> Self {
        Self { root, format }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Convert an absolute path to relative (if within project root)
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Print a command result in the selected format
    pub fn print<T: Serialize + TextOutput>(&self, data: &T) {
        match self.format {
            OutputFormat::Json => print_json(&success_value(data), true),
            OutputFormat::Text => println!("{}", data.to_text()),
        }
    }

    /// Print one compact JSON line, used by the session protocol
    pub fn print_line<T: Serialize>(&self, data: &T) {
        print_json(&success_value(data), false);
    }

    pub fn print_error_line(&self, message: &str) {
        print_json(&error_value(message), false);
    }
}

/// Data fields at top level, plus `"success": true`
fn success_value<T: Serialize>(data: &T) -> serde_json::Value {
    let mut response = serde_json::to_value(data).unwrap_or(serde_json::json!({}));
    match response.as_object_mut() {
        Some(obj) => {
            obj.insert("success".to_string(), serde_json::json!(true));
            response
        }
        None => serde_json::json!({ "success": true, "data": response }),
    }
}

pub fn error_value(message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": message
    })
}

fn print_json(value: &serde_json::Value, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let ctx = OutputContext::new(PathBuf::from("/project"), OutputFormat::Json);

        assert_eq!(
            ctx.relative_path(Path::new("/project/src/main.rs")),
            "src/main.rs"
        );
        assert_eq!(
            ctx.relative_path(Path::new("/other/file.rs")),
            "/other/file.rs"
        );
    }

    #[test]
    fn test_success_value_flattens_objects() {
        #[derive(Serialize)]
        struct Data {
            lines: Vec<u32>,
        }

        let value = success_value(&Data { lines: vec![3, 9] });
        assert_eq!(value["success"], true);
        assert_eq!(value["lines"], serde_json::json!([3, 9]));

        let wrapped = success_value(&vec![1, 2]);
        assert_eq!(wrapped["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
