use crate::checks;
use crate::config::RiskConfig;
use crate::error::Result;
use crate::render::{text_table, Report};
use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    #[default]
    Open,
    Mitigating,
    Closed,
}

impl RiskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskStatus::Open => "open",
            RiskStatus::Mitigating => "mitigating",
            RiskStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub title: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub probability: u8,
    pub impact: u8,
    #[serde(default, deserialize_with = "blank_as_open")]
    pub status: RiskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

fn default_category() -> String {
    "general".to_string()
}

/// A blank or null status cell reads as the default status.
fn blank_as_open<'de, D>(deserializer: D) -> std::result::Result<RiskStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(RiskStatus::default()),
        Some(s) => {
            let de: StrDeserializer<'_, D::Error> = s.into_deserializer();
            RiskStatus::deserialize(de)
        }
    }
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
    pub fn from_score(score: u32, cfg: &RiskConfig) -> RiskLevel {
        if score >= cfg.critical {
            RiskLevel::Critical
        } else if score >= cfg.high {
            RiskLevel::High
        } else if score >= cfg.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ScoredRisk {
    #[serde(flatten)]
    pub risk: Risk,
    pub score: u32,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryExposure {
    pub category: String,
    pub open_risks: usize,
    pub exposure: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub exposure: u32,
    pub by_level: BTreeMap<String, usize>,
    pub by_category: Vec<CategoryExposure>,
    /// heat_map[p-1][i-1] = count of non-closed risks with probability p, impact i.
    pub heat_map: [[usize; 5]; 5],
    pub items: Vec<ScoredRisk>,
}

pub fn assess(risks: Vec<Risk>, cfg: &RiskConfig) -> Result<RiskReport> {
    for r in &risks {
        let id = r.id.as_str();
        checks::require_id(id)?;
        checks::require_scale(id, "probability", r.probability, 1, 5)?;
        checks::require_scale(id, "impact", r.impact, 1, 5)?;
    }
    checks::warn_duplicate_ids(risks.iter().map(|r| r.id.as_str()));

    let mut items: Vec<ScoredRisk> = risks
        .into_iter()
        .map(|risk| {
            let score = u32::from(risk.probability) * u32::from(risk.impact);
            ScoredRisk {
                level: RiskLevel::from_score(score, cfg),
                score,
                risk,
            }
        })
        .collect();
    items.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.risk.id.cmp(&b.risk.id)));

    let mut heat_map = [[0usize; 5]; 5];
    let mut by_level: BTreeMap<String, usize> = BTreeMap::new();
    let mut categories: BTreeMap<String, (usize, u32)> = BTreeMap::new();
    let mut exposure = 0;
    let mut closed = 0;
    for item in &items {
        if item.risk.status == RiskStatus::Closed {
            closed += 1;
            continue;
        }
        let p = usize::from(item.risk.probability) - 1;
        let i = usize::from(item.risk.impact) - 1;
        heat_map[p][i] += 1;
        exposure += item.score;
        *by_level.entry(item.level.as_str().to_string()).or_insert(0) += 1;
        let entry = categories.entry(item.risk.category.clone()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += item.score;
    }

    let mut by_category: Vec<CategoryExposure> = categories
        .into_iter()
        .map(|(category, (open_risks, exposure))| CategoryExposure {
            category,
            open_risks,
            exposure,
        })
        .collect();
    by_category.sort_by(|a, b| {
        b.exposure
            .cmp(&a.exposure)
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(RiskReport {
        total: items.len(),
        open: items.len() - closed,
        closed,
        exposure,
        by_level,
        by_category,
        heat_map,
        items,
    })
}

impl RiskReport {
    fn heat_map_text(&self) -> String {
        let mut out = String::from("HEAT MAP (open risks; rows = probability, cols = impact)\n");
        out.push_str("      1   2   3   4   5\n");
        for p in (0..5).rev() {
            out.push_str(&format!("  {} ", p + 1));
            for i in 0..5 {
                let n = self.heat_map[p][i];
                if n == 0 {
                    out.push_str("   .");
                } else {
                    out.push_str(&format!("{n:>4}"));
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Report for RiskReport {
    fn render_text(&self) -> String {
        let mut out = String::from("RISK REGISTER\n\n");
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|s| {
                vec![
                    s.risk.id.clone(),
                    s.risk.title.clone(),
                    s.risk.category.clone(),
                    format!("{}x{}", s.risk.probability, s.risk.impact),
                    s.score.to_string(),
                    s.level.as_str().to_string(),
                    s.risk.status.as_str().to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["id", "title", "category", "PxI", "score", "level", "status"],
            &rows,
        ));
        out.push_str(&format!(
            "\nRisks: {} ({} open, {} closed) | Exposure: {}\n",
            self.total, self.open, self.closed, self.exposure
        ));
        if !self.by_category.is_empty() {
            out.push_str("\nEXPOSURE BY CATEGORY\n");
            for c in &self.by_category {
                out.push_str(&format!(
                    "  {:<20} {:>4}  ({} open)\n",
                    c.category, c.exposure, c.open_risks
                ));
            }
        }
        out.push('\n');
        out.push_str(&self.heat_map_text());
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "id",
            "title",
            "category",
            "probability",
            "impact",
            "score",
            "level",
            "status",
            "owner",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|s| {
                vec![
                    s.risk.id.clone(),
                    s.risk.title.clone(),
                    s.risk.category.clone(),
                    s.risk.probability.to_string(),
                    s.risk.impact.to_string(),
                    s.score.to_string(),
                    s.level.as_str().to_string(),
                    s.risk.status.as_str().to_string(),
                    s.risk.owner.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(id: &str, category: &str, p: u8, i: u8, status: RiskStatus) -> Risk {
        Risk {
            id: id.to_string(),
            title: format!("Risk {id}"),
            category: category.to_string(),
            probability: p,
            impact: i,
            status,
            owner: None,
            mitigation: None,
        }
    }

    #[test]
    fn levels_from_score() {
        let cfg = RiskConfig::default();
        assert_eq!(RiskLevel::from_score(25, &cfg), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(16, &cfg), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(8, &cfg), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(6, &cfg), RiskLevel::Low);
    }

    #[test]
    fn exposure_ignores_closed() {
        let report = assess(
            vec![
                risk("R1", "schedule", 4, 4, RiskStatus::Open),
                risk("R2", "schedule", 2, 3, RiskStatus::Mitigating),
                risk("R3", "budget", 5, 5, RiskStatus::Closed),
            ],
            &RiskConfig::default(),
        )
        .unwrap();
        assert_eq!(report.exposure, 22);
        assert_eq!(report.open, 2);
        assert_eq!(report.closed, 1);
        assert_eq!(report.heat_map[3][3], 1);
        assert_eq!(report.heat_map[4][4], 0);
        assert_eq!(report.by_category.len(), 1);
        assert_eq!(report.by_category[0].category, "schedule");
        assert_eq!(report.by_level.get("high"), Some(&1));
    }

    #[test]
    fn sorted_by_score() {
        let report = assess(
            vec![
                risk("R1", "a", 1, 1, RiskStatus::Open),
                risk("R2", "a", 3, 3, RiskStatus::Open),
            ],
            &RiskConfig::default(),
        )
        .unwrap();
        assert_eq!(report.items[0].risk.id, "R2");
    }

    #[test]
    fn out_of_range_probability() {
        let err = assess(vec![risk("R9", "a", 6, 1, RiskStatus::Open)], &RiskConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("probability"));
    }

    #[test]
    fn status_defaults_to_open_on_load() {
        let r: Risk = serde_json::from_str(
            r#"{"id":"R1","title":"Vendor delay","probability":3,"impact":4}"#,
        )
        .unwrap();
        assert_eq!(r.status, RiskStatus::Open);
        assert_eq!(r.category, "general");
    }

    #[test]
    fn blank_status_cell_is_open() {
        use crate::input::{parse_records, InputFormat};
        let text = "id,title,category,probability,impact,status\n\
                    R1,Vendor delay,ops,3,4,\n\
                    R2,Key person,people,2,5,closed\n";
        let risks: Vec<Risk> = parse_records(text, InputFormat::Csv, &[]).unwrap();
        assert_eq!(risks[0].status, RiskStatus::Open);
        assert_eq!(risks[1].status, RiskStatus::Closed);

        let bad = "id,title,probability,impact,status\nR1,Vendor,3,4,paused\n";
        let err = parse_records::<Risk>(bad, InputFormat::Csv, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn heat_map_text_marks_counts() {
        let report = assess(
            vec![risk("R1", "a", 5, 1, RiskStatus::Open)],
            &RiskConfig::default(),
        )
        .unwrap();
        let text = report.render_text();
        assert!(text.contains("  5    1   .   .   .   ."));
    }
}
