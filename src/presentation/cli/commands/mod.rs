pub mod scan;
pub mod sync;

pub use scan::{ScanArgs, ScanCommand};
pub use sync::{ConsoleReporter, SyncArgs, SyncCommand};

use clap::ValueEnum;
use serde::Serialize;
use std::path::Path;

/// Output format options for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    /// Serialize `value` to stdout. Text is rendered by each command itself.
    pub fn print<T: Serialize>(self, value: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            OutputFormat::Text => {}
        }
        Ok(())
    }
}

/// `path` relative to `base` when that is shorter to read, else as is
pub fn display_path(path: &Path, base: &Path) -> String {
    match pathdiff::diff_paths(path, base) {
        Some(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Some(relative) if !relative.starts_with("..") => relative.display().to_string(),
        _ => path.display().to_string(),
    }
}
