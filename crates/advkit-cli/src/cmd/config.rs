use crate::cmd::Ctx;
use crate::output::{emit, write_output};
use advkit_core::config::{Config, ConfigWarning, WarnLevel};
use advkit_core::render::{Format, Report};
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (defaults merged with the file)
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(ctx: &Ctx, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx),
        ConfigSubcommand::Validate => validate(ctx),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(ctx: &Ctx) -> anyhow::Result<()> {
    let rendered = match ctx.format {
        Format::Json => {
            let mut s = serde_json::to_string_pretty(&ctx.config)?;
            s.push('\n');
            s
        }
        Format::Text => ctx.config.to_yaml()?,
        Format::Csv => return emit(ctx, &SettingsListing::from_config(&ctx.config)?),
    };
    write_output(ctx.file.as_deref(), &rendered)
}

/// One `section.key,value` row per effective setting.
#[derive(Serialize)]
struct SettingsListing {
    settings: Vec<Setting>,
}

#[derive(Serialize)]
struct Setting {
    key: String,
    value: String,
}

impl SettingsListing {
    fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut settings = Vec::new();
        flatten("", &serde_json::to_value(config)?, &mut settings);
        Ok(SettingsListing { settings })
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<Setting>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, v, out);
            }
        }
        serde_json::Value::String(s) => out.push(Setting {
            key: prefix.to_string(),
            value: s.clone(),
        }),
        other => out.push(Setting {
            key: prefix.to_string(),
            value: other.to_string(),
        }),
    }
}

impl Report for SettingsListing {
    fn render_text(&self) -> String {
        self.settings
            .iter()
            .map(|s| format!("{} = {}\n", s.key, s.value))
            .collect()
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec!["key", "value"]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.settings
            .iter()
            .map(|s| vec![s.key.clone(), s.value.clone()])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// `config validate` output; renders like any tool report.
#[derive(Serialize)]
struct ValidationReport {
    warnings: Vec<ConfigWarning>,
}

impl Report for ValidationReport {
    fn render_text(&self) -> String {
        if self.warnings.is_empty() {
            return "Config is valid. No warnings.\n".to_string();
        }
        self.warnings
            .iter()
            .map(|w| format!("[{}] {}\n", level_str(w.level), w.message))
            .collect()
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec!["level", "message"]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.warnings
            .iter()
            .map(|w| vec![level_str(w.level).to_string(), w.message.clone()])
            .collect()
    }
}

fn validate(ctx: &Ctx) -> anyhow::Result<()> {
    let report = ValidationReport {
        warnings: ctx.config.validate(),
    };
    emit(ctx, &report)?;

    let has_errors = report.warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

fn level_str(level: WarnLevel) -> &'static str {
    match level {
        WarnLevel::Warning => "warning",
        WarnLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_listing_uses_dotted_keys() {
        let listing = SettingsListing::from_config(&Config::default()).unwrap();
        let rows = listing.csv_rows();
        assert!(rows.contains(&vec!["capa.stall_days".to_string(), "90".to_string()]));
        assert!(rows.contains(&vec!["rpn.critical".to_string(), "200".to_string()]));
        assert!(rows.iter().all(|r| r[0].contains('.')));
    }
}
