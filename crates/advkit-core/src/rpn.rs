//! FMEA risk priority numbers: severity x occurrence x detection.

use crate::checks;
use crate::config::RpnConfig;
use crate::error::Result;
use crate::render::{text_table, Report};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureMode {
    pub id: String,
    pub item: String,
    pub failure_mode: String,
    #[serde(default)]
    pub effect: String,
    pub severity: u8,
    pub occurrence: u8,
    pub detection: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn requires_action(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

pub fn rpn(fm: &FailureMode) -> u32 {
    u32::from(fm.severity) * u32::from(fm.occurrence) * u32::from(fm.detection)
}

pub fn level(fm: &FailureMode, value: u32, cfg: &RpnConfig) -> RiskLevel {
    if value >= cfg.critical || fm.severity >= cfg.severity_override {
        RiskLevel::Critical
    } else if value >= cfg.high {
        RiskLevel::High
    } else if value >= cfg.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredFailureMode {
    #[serde(flatten)]
    pub failure: FailureMode,
    pub rpn: u32,
    pub level: RiskLevel,
    pub action_required: bool,
    pub pareto: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpnReport {
    pub total_rpn: u32,
    pub average_rpn: f64,
    pub max_rpn: u32,
    pub action_required: usize,
    pub levels: LevelCounts,
    /// Ids of the shortest top-ranked set covering 80% of total RPN.
    pub pareto: Vec<String>,
    pub items: Vec<ScoredFailureMode>,
}

pub fn analyze(modes: Vec<FailureMode>, cfg: &RpnConfig) -> Result<RpnReport> {
    for fm in &modes {
        let id = fm.id.as_str();
        checks::require_id(id)?;
        checks::require_scale(id, "severity", fm.severity, 1, 10)?;
        checks::require_scale(id, "occurrence", fm.occurrence, 1, 10)?;
        checks::require_scale(id, "detection", fm.detection, 1, 10)?;
    }
    checks::warn_duplicate_ids(modes.iter().map(|m| m.id.as_str()));

    let mut items: Vec<ScoredFailureMode> = modes
        .into_iter()
        .map(|failure| {
            let value = rpn(&failure);
            let lvl = level(&failure, value, cfg);
            ScoredFailureMode {
                failure,
                rpn: value,
                level: lvl,
                action_required: lvl.requires_action(),
                pareto: false,
            }
        })
        .collect();
    items.sort_by(|a, b| b.rpn.cmp(&a.rpn).then_with(|| a.failure.id.cmp(&b.failure.id)));

    let total: u32 = items.iter().map(|i| i.rpn).sum();
    let threshold = f64::from(total) * 0.8;
    let mut cumulative = 0u32;
    let mut pareto = Vec::new();
    for item in items.iter_mut() {
        if f64::from(cumulative) >= threshold {
            break;
        }
        cumulative += item.rpn;
        item.pareto = true;
        pareto.push(item.failure.id.clone());
    }

    let mut levels = LevelCounts::default();
    for i in &items {
        match i.level {
            RiskLevel::Critical => levels.critical += 1,
            RiskLevel::High => levels.high += 1,
            RiskLevel::Medium => levels.medium += 1,
            RiskLevel::Low => levels.low += 1,
        }
    }

    Ok(RpnReport {
        total_rpn: total,
        average_rpn: crate::render::round2(f64::from(total) / items.len() as f64),
        max_rpn: items.first().map(|i| i.rpn).unwrap_or(0),
        action_required: items.iter().filter(|i| i.action_required).count(),
        levels,
        pareto,
        items,
    })
}

impl Report for RpnReport {
    fn render_text(&self) -> String {
        let mut out = String::from("FMEA RISK PRIORITY NUMBERS\n\n");
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|i| {
                vec![
                    i.failure.id.clone(),
                    i.failure.item.clone(),
                    i.failure.failure_mode.clone(),
                    format!(
                        "{}x{}x{}",
                        i.failure.severity, i.failure.occurrence, i.failure.detection
                    ),
                    i.rpn.to_string(),
                    i.level.as_str().to_string(),
                    if i.action_required { "ACTION" } else { "" }.to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["id", "item", "failure mode", "SxOxD", "rpn", "level", ""],
            &rows,
        ));
        out.push_str(&format!(
            "\nTotal RPN: {} | Average: {:.2} | Max: {}\n",
            self.total_rpn, self.average_rpn, self.max_rpn
        ));
        out.push_str(&format!(
            "Critical: {} | High: {} | Medium: {} | Low: {}\n",
            self.levels.critical, self.levels.high, self.levels.medium, self.levels.low
        ));
        out.push_str(&format!(
            "Action required: {}\nPareto (80% of total RPN): {}\n",
            self.action_required,
            self.pareto.join(", ")
        ));
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "id",
            "item",
            "failure_mode",
            "effect",
            "severity",
            "occurrence",
            "detection",
            "rpn",
            "level",
            "action_required",
            "pareto",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|i| {
                vec![
                    i.failure.id.clone(),
                    i.failure.item.clone(),
                    i.failure.failure_mode.clone(),
                    i.failure.effect.clone(),
                    i.failure.severity.to_string(),
                    i.failure.occurrence.to_string(),
                    i.failure.detection.to_string(),
                    i.rpn.to_string(),
                    i.level.as_str().to_string(),
                    i.action_required.to_string(),
                    i.pareto.to_string(),
                ]
            })
            .collect()
    }
}
