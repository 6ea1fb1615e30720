//! Output rendering.
//!
//! Every command produces a serializable value; this module turns it into
//! YAML or pretty JSON on stdout. Sensitive configuration values are redacted
//! before they get here.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Render `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(value).context("Failed to serialize YAML output"),
            Self::Json => serde_json::to_string_pretty(value)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .context("Failed to serialize JSON output"),
        }
    }
}

/// Render `value` and print it to stdout.
pub fn print<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    print!("{}", format.render(value)?);
    Ok(())
}
