pub mod audit;
pub mod backlog;
pub mod cac;
pub mod capa;
pub mod config;
pub mod docs;
pub mod readability;
pub mod rice;
pub mod risk;
pub mod rpn;
pub mod scaffold;
pub mod sprint;
pub mod voice;

use advkit_core::config::Config;
use advkit_core::render::Format;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

/// Settings shared by every command after argument parsing.
pub struct Ctx {
    pub format: Format,
    pub file: Option<PathBuf>,
    pub config: Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
            OutputFormat::Csv => Format::Csv,
        }
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Input file; `-` or omitted reads stdin
    #[arg(value_name = "INPUT", conflicts_with = "input")]
    pub path: Option<PathBuf>,

    /// Input file (alternative to the positional argument)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,
}

impl InputArgs {
    pub fn path(&self) -> Option<&Path> {
        self.input.as_deref().or(self.path.as_deref())
    }
}

#[derive(Args, Debug)]
pub struct AsOfArgs {
    /// Reference date (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

impl AsOfArgs {
    pub fn date(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Largest `--horizon-months` accepted (one hundred years).
pub const MAX_HORIZON_MONTHS: i64 = 1200;

fn parse_number(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|_| format!("'{s}' is not a number"))?;
    if !v.is_finite() {
        return Err(format!("'{s}' is not a finite number"));
    }
    Ok(v)
}

/// clap value parser for amounts that must be greater than zero.
pub fn positive_number(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if v <= 0.0 {
        return Err(format!("must be greater than zero, got {v}"));
    }
    Ok(v)
}

/// clap value parser for amounts that may be zero but not negative.
pub fn non_negative_number(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if v < 0.0 {
        return Err(format!("must not be negative, got {v}"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_parsers() {
        assert_eq!(positive_number("2.5"), Ok(2.5));
        assert!(positive_number("0").is_err());
        assert!(positive_number("-3").is_err());
        assert!(positive_number("NaN").is_err());
        assert_eq!(non_negative_number("0"), Ok(0.0));
        assert!(non_negative_number("-0.5").is_err());
        assert!(non_negative_number("lots").is_err());
    }
}
