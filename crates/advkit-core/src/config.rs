use crate::error::{AdvkitError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = ".advkit.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RiceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiceConfig {
    /// Impact at or above this is "high impact".
    pub high_impact: f64,
    /// Effort (person-months) at or below this is "low effort".
    pub low_effort: f64,
}

impl Default for RiceConfig {
    fn default() -> Self {
        Self {
            high_impact: 2.0,
            low_effort: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// BacklogConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogConfig {
    pub business_value_weight: f64,
    pub time_criticality_weight: f64,
    pub risk_reduction_weight: f64,
    /// Share of the ranked backlog placed in the "now" bucket.
    pub now_fraction: f64,
    /// Share placed in the "next" bucket after "now".
    pub next_fraction: f64,
}

impl Default for BacklogConfig {
    fn default() -> Self {
        Self {
            business_value_weight: 0.4,
            time_criticality_weight: 0.3,
            risk_reduction_weight: 0.3,
            now_fraction: 0.2,
            next_fraction: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// RpnConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpnConfig {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    /// Severity at or above this is critical regardless of RPN.
    pub severity_override: u8,
}

impl Default for RpnConfig {
    fn default() -> Self {
        Self {
            critical: 200,
            high: 120,
            medium: 80,
            severity_override: 9,
        }
    }
}

// ---------------------------------------------------------------------------
// RiskConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            critical: 20,
            high: 15,
            medium: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// CacConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacConfig {
    pub healthy_ratio: f64,
    pub payback_target_months: f64,
}

impl Default for CacConfig {
    fn default() -> Self {
        Self {
            healthy_ratio: 3.0,
            payback_target_months: 12.0,
        }
    }
}

// ---------------------------------------------------------------------------
// CapaConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapaConfig {
    pub stall_days: i64,
}

impl Default for CapaConfig {
    fn default() -> Self {
        Self { stall_days: 90 }
    }
}

// ---------------------------------------------------------------------------
// AuditConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub high_frequency_months: u32,
    pub medium_frequency_months: u32,
    pub low_frequency_months: u32,
    pub due_soon_days: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            high_frequency_months: 6,
            medium_frequency_months: 12,
            low_frequency_months: 24,
            due_soon_days: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// DocsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub review_cycle_months: u32,
    pub due_soon_days: i64,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            review_cycle_months: 12,
            due_soon_days: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ReadabilityConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadabilityConfig {
    pub long_sentence_words: usize,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self {
            long_sentence_words: 25,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rice: RiceConfig,
    pub backlog: BacklogConfig,
    pub rpn: RpnConfig,
    pub risk: RiskConfig,
    pub cac: CacConfig,
    pub capa: CapaConfig,
    pub audit: AuditConfig,
    pub docs: DocsConfig,
    pub readability: ReadabilityConfig,
}

impl Config {
    /// Load the effective config.
    ///
    /// An explicit path must exist. Without one, `.advkit.yaml` in `cwd` is
    /// used when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(AdvkitError::InvalidConfig(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Config::default());
                }
                candidate
            }
        };
        let data = std::fs::read_to_string(&path)?;
        let cfg = Self::parse(&data)
            .map_err(|e| AdvkitError::InvalidConfig(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn parse(data: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(data)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        let b = &self.backlog;
        let weights = [
            b.business_value_weight,
            b.time_criticality_weight,
            b.risk_reduction_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            error("backlog weights must not be negative".to_string());
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            error("backlog weights must sum to more than zero".to_string());
        }
        if b.now_fraction < 0.0 || b.next_fraction < 0.0 || b.now_fraction + b.next_fraction > 1.0
        {
            error(format!(
                "backlog bucket fractions must be non-negative and sum to at most 1 (now={}, next={})",
                b.now_fraction, b.next_fraction
            ));
        }

        let r = &self.rpn;
        if !(r.medium <= r.high && r.high <= r.critical) {
            error(format!(
                "rpn thresholds must ascend: medium {} <= high {} <= critical {}",
                r.medium, r.high, r.critical
            ));
        }
        if r.critical > 1000 {
            error(format!("rpn.critical {} exceeds the maximum RPN of 1000", r.critical));
        }

        let k = &self.risk;
        if !(k.medium <= k.high && k.high <= k.critical) {
            error(format!(
                "risk thresholds must ascend: medium {} <= high {} <= critical {}",
                k.medium, k.high, k.critical
            ));
        }

        let a = &self.audit;
        if a.high_frequency_months == 0
            || a.medium_frequency_months == 0
            || a.low_frequency_months == 0
        {
            error("audit frequencies must be at least one month".to_string());
        }
        if self.docs.review_cycle_months == 0 {
            error("docs.review_cycle_months must be at least one".to_string());
        }
        for (key, days) in [
            ("capa.stall_days", self.capa.stall_days),
            ("audit.due_soon_days", a.due_soon_days),
            ("docs.due_soon_days", self.docs.due_soon_days),
        ] {
            if days < 0 {
                error(format!("{key} must not be negative, got {days}"));
            }
        }

        if self.rice.low_effort <= 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "rice.low_effort <= 0 means no item is ever low effort".to_string(),
            });
        }
        if a.high_frequency_months > a.medium_frequency_months
            || a.medium_frequency_months > a.low_frequency_months
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "high-risk areas are audited less often than lower-risk ones".to_string(),
            });
        }
        if self.cac.healthy_ratio < 1.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "cac.healthy_ratio {} treats loss-making channels as healthy",
                    self.cac.healthy_ratio
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = cfg.to_yaml().unwrap();
        let parsed = Config::parse(&yaml).unwrap();
        assert_eq!(parsed.rpn.critical, 200);
        assert_eq!(parsed.audit.low_frequency_months, 24);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = Config::parse("rpn:\n  critical: 150\n").unwrap();
        assert_eq!(cfg.rpn.critical, 150);
        assert_eq!(cfg.rpn.high, 120);
        assert_eq!(cfg.capa.stall_days, 90);
    }

    #[test]
    fn empty_file_is_default() {
        let cfg = Config::parse("  \n").unwrap();
        assert_eq!(cfg.backlog.now_fraction, 0.2);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(None, dir.path()).unwrap();
        assert_eq!(cfg.risk.critical, 20);
    }

    #[test]
    fn load_finds_default_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "capa:\n  stall_days: 45\n").unwrap();
        let cfg = Config::load(None, dir.path()).unwrap();
        assert_eq!(cfg.capa.stall_days, 45);
    }

    #[test]
    fn load_missing_explicit_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.yaml")), dir.path()).unwrap_err();
        assert!(matches!(err, AdvkitError::InvalidConfig(_)));
    }

    #[test]
    fn load_malformed_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "rpn: [unclosed").unwrap();
        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, AdvkitError::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn validate_defaults_clean() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_descending_thresholds() {
        let mut cfg = Config::default();
        cfg.rpn.high = 300;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert!(warnings[0].message.contains("rpn thresholds"));
    }

    #[test]
    fn validate_negative_day_counts() {
        let cfg = Config::parse(
            "capa:\n  stall_days: -1\naudit:\n  due_soon_days: -7\ndocs:\n  due_soon_days: 0\n",
        )
        .unwrap();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Error));
        assert!(warnings[0].message.contains("capa.stall_days"));
        assert!(warnings[1].message.contains("audit.due_soon_days"));
    }

    #[test]
    fn validate_zero_weights() {
        let mut cfg = Config::default();
        cfg.backlog.business_value_weight = 0.0;
        cfg.backlog.time_criticality_weight = 0.0;
        cfg.backlog.risk_reduction_weight = 0.0;
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.message.contains("sum to more than zero")));
    }

    #[test]
    fn validate_inverted_audit_frequency_is_warning() {
        let mut cfg = Config::default();
        cfg.audit.high_frequency_months = 36;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }
}
