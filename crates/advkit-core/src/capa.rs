//! Corrective and preventive action (CAPA) tracking report.
//!
//! Status values describe where each record sits in the CAPA lifecycle as
//! reported by the source system. They are read as-is; nothing here moves a
//! record between states.

use crate::checks;
use crate::config::CapaConfig;
use crate::error::{AdvkitError, Result};
use crate::render::{fmt_opt2, pct, round2, text_table, Report};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CapaStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapaStatus {
    #[serde(alias = "initiated")]
    Initiated,
    #[serde(alias = "investigating")]
    Investigating,
    #[serde(alias = "root_cause_identified")]
    RootCauseIdentified,
    #[serde(alias = "action_planned")]
    ActionPlanned,
    #[serde(alias = "implementing")]
    Implementing,
    #[serde(alias = "verifying")]
    Verifying,
    #[serde(alias = "closed")]
    Closed,
}

impl CapaStatus {
    pub fn all() -> &'static [CapaStatus] {
        &[
            CapaStatus::Initiated,
            CapaStatus::Investigating,
            CapaStatus::RootCauseIdentified,
            CapaStatus::ActionPlanned,
            CapaStatus::Implementing,
            CapaStatus::Verifying,
            CapaStatus::Closed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CapaStatus::Initiated => "INITIATED",
            CapaStatus::Investigating => "INVESTIGATING",
            CapaStatus::RootCauseIdentified => "ROOT_CAUSE_IDENTIFIED",
            CapaStatus::ActionPlanned => "ACTION_PLANNED",
            CapaStatus::Implementing => "IMPLEMENTING",
            CapaStatus::Verifying => "VERIFYING",
            CapaStatus::Closed => "CLOSED",
        }
    }

    pub fn is_open(self) -> bool {
        self != CapaStatus::Closed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapaSeverity {
    #[serde(alias = "CRITICAL")]
    Critical,
    #[serde(alias = "MAJOR")]
    Major,
    #[serde(alias = "MINOR")]
    Minor,
}

impl CapaSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            CapaSeverity::Critical => "critical",
            CapaSeverity::Major => "major",
            CapaSeverity::Minor => "minor",
        }
    }
}

// ---------------------------------------------------------------------------
// CapaRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapaRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub source: String,
    pub severity: CapaSeverity,
    pub status: CapaStatus,
    pub opened: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<bool>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CapaAssessment {
    #[serde(flatten)]
    pub record: CapaRecord,
    /// Days open (open records) or cycle time (closed records).
    pub age_days: i64,
    pub overdue: bool,
    pub stalled: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgingBuckets {
    pub d0_30: usize,
    pub d31_60: usize,
    pub d61_90: usize,
    pub over_90: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: CapaStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapaReport {
    pub as_of: NaiveDate,
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub overdue: usize,
    pub stalled: usize,
    pub by_status: Vec<StatusCount>,
    pub by_severity: std::collections::BTreeMap<String, usize>,
    pub aging: AgingBuckets,
    pub average_open_age_days: Option<f64>,
    pub average_cycle_time_days: Option<f64>,
    pub on_time_closure_rate: Option<f64>,
    pub effectiveness_rate: Option<f64>,
    pub items: Vec<CapaAssessment>,
}

fn validate(records: &[CapaRecord]) -> Result<()> {
    for r in records {
        checks::require_id(&r.id)?;
        if let Some(closed) = r.closed {
            if closed < r.opened {
                return Err(AdvkitError::invalid(
                    &r.id,
                    format!("closed date {closed} is before opened date {}", r.opened),
                ));
            }
        }
        if r.status == CapaStatus::Closed && r.closed.is_none() {
            tracing::warn!(record = %r.id, "CLOSED record has no closed date");
        }
    }
    checks::warn_duplicate_ids(records.iter().map(|r| r.id.as_str()));
    Ok(())
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| round2(values.iter().sum::<f64>() / values.len() as f64))
}

fn rate(hits: usize, of: usize) -> Option<f64> {
    (of > 0).then(|| round2(hits as f64 / of as f64))
}

pub fn track(records: Vec<CapaRecord>, as_of: NaiveDate, cfg: &CapaConfig) -> Result<CapaReport> {
    validate(&records)?;

    let mut aging = AgingBuckets::default();
    let mut open_ages = Vec::new();
    let mut cycle_times = Vec::new();
    let (mut closed_with_due, mut closed_on_time) = (0, 0);
    let (mut rated, mut effective) = (0, 0);
    let mut by_severity = std::collections::BTreeMap::new();

    let mut items: Vec<CapaAssessment> = Vec::with_capacity(records.len());
    for record in records {
        *by_severity.entry(record.severity.as_str().to_string()).or_insert(0) += 1;
        let open = record.status.is_open();
        let (age_days, overdue, stalled) = if open {
            let age = (as_of - record.opened).num_days().max(0);
            match age {
                0..=30 => aging.d0_30 += 1,
                31..=60 => aging.d31_60 += 1,
                61..=90 => aging.d61_90 += 1,
                _ => aging.over_90 += 1,
            }
            open_ages.push(age as f64);
            let overdue = record.due.is_some_and(|d| d < as_of);
            (age, overdue, age > cfg.stall_days)
        } else {
            let end = record.closed.unwrap_or(as_of);
            let cycle = (end - record.opened).num_days().max(0);
            if record.closed.is_some() {
                cycle_times.push(cycle as f64);
            }
            if let (Some(closed), Some(due)) = (record.closed, record.due) {
                closed_with_due += 1;
                if closed <= due {
                    closed_on_time += 1;
                }
            }
            if let Some(e) = record.effective {
                rated += 1;
                if e {
                    effective += 1;
                }
            }
            (cycle, false, false)
        };
        items.push(CapaAssessment {
            record,
            age_days,
            overdue,
            stalled,
        });
    }

    // Open first, oldest first; closed after, by id.
    items.sort_by(|a, b| {
        b.record
            .status
            .is_open()
            .cmp(&a.record.status.is_open())
            .then_with(|| b.age_days.cmp(&a.age_days))
            .then_with(|| a.record.id.cmp(&b.record.id))
    });

    let by_status = CapaStatus::all()
        .iter()
        .map(|&s| StatusCount {
            status: s,
            count: items.iter().filter(|i| i.record.status == s).count(),
        })
        .collect();

    let open = items.iter().filter(|i| i.record.status.is_open()).count();
    tracing::debug!(total = items.len(), open, "capa tracking complete");
    Ok(CapaReport {
        as_of,
        total: items.len(),
        open,
        closed: items.len() - open,
        overdue: items.iter().filter(|i| i.overdue).count(),
        stalled: items.iter().filter(|i| i.stalled).count(),
        by_status,
        by_severity,
        aging,
        average_open_age_days: mean(&open_ages),
        average_cycle_time_days: mean(&cycle_times),
        on_time_closure_rate: rate(closed_on_time, closed_with_due),
        effectiveness_rate: rate(effective, rated),
        items,
    })
}

impl Report for CapaReport {
    fn render_text(&self) -> String {
        let mut out = format!("CAPA STATUS REPORT (as of {})\n\n", self.as_of);
        out.push_str(&format!(
            "Total: {} | Open: {} | Closed: {} | Overdue: {} | Stalled: {}\n\n",
            self.total, self.open, self.closed, self.overdue, self.stalled
        ));

        out.push_str("BY STATUS\n");
        for s in &self.by_status {
            out.push_str(&format!("  {:<24} {}\n", s.status.as_str(), s.count));
        }
        out.push_str("\nBY SEVERITY\n");
        for (sev, n) in &self.by_severity {
            out.push_str(&format!("  {:<24} {}\n", sev, n));
        }
        out.push_str(&format!(
            "\nAGING (open)  0-30: {} | 31-60: {} | 61-90: {} | 90+: {}\n",
            self.aging.d0_30, self.aging.d31_60, self.aging.d61_90, self.aging.over_90
        ));
        out.push_str(&format!(
            "Average open age: {} days | Average cycle time: {} days\n",
            fmt_opt2(self.average_open_age_days),
            fmt_opt2(self.average_cycle_time_days)
        ));
        out.push_str(&format!(
            "On-time closure: {} | Effectiveness: {}\n\n",
            pct(self.on_time_closure_rate),
            pct(self.effectiveness_rate)
        ));

        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|i| {
                let mut flags = Vec::new();
                if i.overdue {
                    flags.push("OVERDUE");
                }
                if i.stalled {
                    flags.push("STALLED");
                }
                vec![
                    i.record.id.clone(),
                    i.record.title.clone(),
                    i.record.severity.as_str().to_string(),
                    i.record.status.as_str().to_string(),
                    i.age_days.to_string(),
                    i.record.due.map(|d| d.to_string()).unwrap_or_default(),
                    flags.join(" "),
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["id", "title", "severity", "status", "days", "due", "flags"],
            &rows,
        ));
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "id", "title", "source", "severity", "status", "opened", "due", "closed", "owner",
            "age_days", "overdue", "stalled",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        self.items
            .iter()
            .map(|i| {
                vec![
                    i.record.id.clone(),
                    i.record.title.clone(),
                    i.record.source.clone(),
                    i.record.severity.as_str().to_string(),
                    i.record.status.as_str().to_string(),
                    i.record.opened.to_string(),
                    date(i.record.due),
                    date(i.record.closed),
                    i.record.owner.clone().unwrap_or_default(),
                    i.age_days.to_string(),
                    i.overdue.to_string(),
                    i.stalled.to_string(),
                ]
            })
            .collect()
    }
}
