use crate::checks;
use crate::config::AuditConfig;
use crate::error::{AdvkitError, Result};
use crate::render::{text_table, Report};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaRisk {
    #[serde(alias = "HIGH")]
    High,
    #[serde(alias = "MEDIUM")]
    Medium,
    #[serde(alias = "LOW")]
    Low,
}

impl AreaRisk {
    pub fn as_str(self) -> &'static str {
        match self {
            AreaRisk::High => "high",
            AreaRisk::Medium => "medium",
            AreaRisk::Low => "low",
        }
    }

    pub fn frequency_months(self, cfg: &AuditConfig) -> u32 {
        match self {
            AreaRisk::High => cfg.high_frequency_months,
            AreaRisk::Medium => cfg.medium_frequency_months,
            AreaRisk::Low => cfg.low_frequency_months,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditArea {
    pub id: String,
    pub area: String,
    pub risk: AreaRisk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audit: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Scheduled,
}

impl DueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DueStatus::Overdue => "overdue",
            DueStatus::DueSoon => "due_soon",
            DueStatus::Scheduled => "scheduled",
        }
    }

    pub fn classify(due: NaiveDate, as_of: NaiveDate, due_soon_days: i64) -> DueStatus {
        if due < as_of {
            DueStatus::Overdue
        } else if (due - as_of).num_days() <= due_soon_days {
            DueStatus::DueSoon
        } else {
            DueStatus::Scheduled
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaStatus {
    #[serde(flatten)]
    pub area: AuditArea,
    pub frequency_months: u32,
    pub next_due: NaiveDate,
    pub status: DueStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledAudit {
    pub date: NaiveDate,
    pub id: String,
    pub area: String,
    pub risk: AreaRisk,
    pub status: DueStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub as_of: NaiveDate,
    pub horizon_end: NaiveDate,
    pub overdue: usize,
    pub due_soon: usize,
    pub areas: Vec<AreaStatus>,
    /// Every audit occurrence up to the horizon, in date order.
    pub items: Vec<ScheduledAudit>,
}

fn add_months(id: &str, date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| {
            AdvkitError::invalid(id, format!("date {date} + {months} months is out of range"))
        })
}

pub fn plan(
    areas: Vec<AuditArea>,
    as_of: NaiveDate,
    horizon_months: u32,
    cfg: &AuditConfig,
) -> Result<AuditReport> {
    for a in &areas {
        checks::require_id(&a.id)?;
        if a.risk.frequency_months(cfg) == 0 {
            return Err(AdvkitError::InvalidConfig(format!(
                "audit frequency for {} risk must be at least one month",
                a.risk.as_str()
            )));
        }
    }
    checks::warn_duplicate_ids(areas.iter().map(|a| a.id.as_str()));
    let horizon_end = add_months("horizon", as_of, horizon_months)?;

    let mut statuses = Vec::with_capacity(areas.len());
    let mut schedule = Vec::new();
    for area in areas {
        let freq = area.risk.frequency_months(cfg);
        let next_due = match area.last_audit {
            Some(last) => add_months(&area.id, last, freq)?,
            None => as_of,
        };
        let status = DueStatus::classify(next_due, as_of, cfg.due_soon_days);

        let mut occurrence = next_due;
        while occurrence <= horizon_end {
            schedule.push(ScheduledAudit {
                date: occurrence,
                id: area.id.clone(),
                area: area.area.clone(),
                risk: area.risk,
                status: DueStatus::classify(occurrence, as_of, cfg.due_soon_days),
            });
            // An overdue audit is rescheduled from today, not from its missed date.
            let base = if occurrence < as_of { as_of } else { occurrence };
            occurrence = add_months(&area.id, base, freq)?;
        }

        statuses.push(AreaStatus {
            area,
            frequency_months: freq,
            next_due,
            status,
        });
    }

    statuses.sort_by(|a, b| a.next_due.cmp(&b.next_due).then_with(|| a.area.id.cmp(&b.area.id)));
    schedule.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    Ok(AuditReport {
        as_of,
        horizon_end,
        overdue: statuses.iter().filter(|s| s.status == DueStatus::Overdue).count(),
        due_soon: statuses.iter().filter(|s| s.status == DueStatus::DueSoon).count(),
        areas: statuses,
        items: schedule,
    })
}

impl Report for AuditReport {
    fn render_text(&self) -> String {
        let mut out = format!(
            "AUDIT SCHEDULE ({} to {})\n\n",
            self.as_of, self.horizon_end
        );
        let area_rows: Vec<Vec<String>> = self
            .areas
            .iter()
            .map(|a| {
                vec![
                    a.area.id.clone(),
                    a.area.area.clone(),
                    a.area.risk.as_str().to_string(),
                    a.area
                        .last_audit
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "never".to_string()),
                    a.next_due.to_string(),
                    a.status.as_str().to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["id", "area", "risk", "last audit", "next due", "status"],
            &area_rows,
        ));
        out.push_str(&format!(
            "\nOverdue: {} | Due soon: {}\n\nPLAN\n",
            self.overdue, self.due_soon
        ));
        let plan_rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|s| {
                vec![
                    s.date.to_string(),
                    s.id.clone(),
                    s.area.clone(),
                    s.risk.as_str().to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(&["date", "id", "area", "risk"], &plan_rows));
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec!["date", "id", "area", "risk", "status"]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|s| {
                vec![
                    s.date.to_string(),
                    s.id.clone(),
                    s.area.clone(),
                    s.risk.as_str().to_string(),
                    s.status.as_str().to_string(),
                ]
            })
            .collect()
    }
}
