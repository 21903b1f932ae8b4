use crate::checks;
use crate::config::DocsConfig;
use crate::error::{AdvkitError, Result};
use crate::render::{text_table, Report};
use chrono::{Months, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").unwrap())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    #[serde(alias = "DRAFT")]
    Draft,
    #[serde(alias = "IN_REVIEW")]
    InReview,
    #[serde(alias = "APPROVED")]
    Approved,
    #[serde(alias = "OBSOLETE")]
    Obsolete,
}

impl DocStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocStatus::Draft => "draft",
            DocStatus::InReview => "in_review",
            DocStatus::Approved => "approved",
            DocStatus::Obsolete => "obsolete",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub doc_type: String,
    pub version: String,
    pub status: DocStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_cycle_months: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Overdue,
    DueSoon,
    Current,
    NeverReviewed,
    NotApplicable,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Overdue => "overdue",
            ReviewStatus::DueSoon => "due_soon",
            ReviewStatus::Current => "current",
            ReviewStatus::NeverReviewed => "never_reviewed",
            ReviewStatus::NotApplicable => "not_applicable",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReview {
    #[serde(flatten)]
    pub document: Document,
    pub next_review: Option<NaiveDate>,
    pub review_status: ReviewStatus,
    pub version_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocsReport {
    pub as_of: NaiveDate,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub overdue: usize,
    pub due_soon: usize,
    pub never_reviewed: usize,
    pub findings: Vec<String>,
    pub items: Vec<DocumentReview>,
}

pub fn review_status(
    doc: &Document,
    as_of: NaiveDate,
    cfg: &DocsConfig,
) -> Result<(Option<NaiveDate>, ReviewStatus)> {
    if doc.status != DocStatus::Approved {
        return Ok((None, ReviewStatus::NotApplicable));
    }
    let Some(anchor) = doc.last_reviewed.or(doc.effective_date) else {
        return Ok((None, ReviewStatus::NeverReviewed));
    };
    let cycle = doc.review_cycle_months.unwrap_or(cfg.review_cycle_months);
    if cycle == 0 {
        return Err(AdvkitError::invalid(&doc.id, "review_cycle_months must be at least one"));
    }
    let next = anchor
        .checked_add_months(Months::new(cycle))
        .ok_or_else(|| AdvkitError::invalid(&doc.id, "review date out of range"))?;
    let status = if next < as_of {
        ReviewStatus::Overdue
    } else if (next - as_of).num_days() <= cfg.due_soon_days {
        ReviewStatus::DueSoon
    } else {
        ReviewStatus::Current
    };
    Ok((Some(next), status))
}

pub fn review(documents: Vec<Document>, as_of: NaiveDate, cfg: &DocsConfig) -> Result<DocsReport> {
    for doc in &documents {
        checks::require_id(&doc.id)?;
    }
    checks::warn_duplicate_ids(documents.iter().map(|d| d.id.as_str()));

    let mut findings = Vec::new();
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    let mut items = Vec::with_capacity(documents.len());
    for document in documents {
        *by_status.entry(document.status.as_str().to_string()).or_insert(0) += 1;
        let version_valid = version_re().is_match(document.version.trim());
        if !version_valid {
            findings.push(format!(
                "{}: version '{}' is not in MAJOR.MINOR[.PATCH] form",
                document.id, document.version
            ));
        }
        if document.status == DocStatus::Approved
            && document.owner.as_deref().map_or(true, |o| o.trim().is_empty())
        {
            findings.push(format!("{}: approved document has no owner", document.id));
        }
        let (next_review, status) = review_status(&document, as_of, cfg)?;
        if status == ReviewStatus::NeverReviewed {
            findings.push(format!(
                "{}: approved document has no review or effective date",
                document.id
            ));
        }
        items.push(DocumentReview {
            document,
            next_review,
            review_status: status,
            version_valid,
        });
    }

    // Reviews due first, then by id.
    items.sort_by(|a, b| match (a.next_review, b.next_review) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.document.id.cmp(&b.document.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.document.id.cmp(&b.document.id),
    });

    let count = |s: ReviewStatus| items.iter().filter(|i| i.review_status == s).count();
    Ok(DocsReport {
        as_of,
        total: items.len(),
        by_status,
        overdue: count(ReviewStatus::Overdue),
        due_soon: count(ReviewStatus::DueSoon),
        never_reviewed: count(ReviewStatus::NeverReviewed),
        findings,
        items,
    })
}

impl Report for DocsReport {
    fn render_text(&self) -> String {
        let mut out = format!("DOCUMENT CONTROL REVIEW (as of {})\n\n", self.as_of);
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|i| {
                vec![
                    i.document.id.clone(),
                    i.document.title.clone(),
                    i.document.version.clone(),
                    i.document.status.as_str().to_string(),
                    i.next_review.map(|d| d.to_string()).unwrap_or_default(),
                    i.review_status.as_str().to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["id", "title", "version", "status", "next review", "review"],
            &rows,
        ));
        let statuses: Vec<String> = self
            .by_status
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        out.push_str(&format!(
            "\nDocuments: {} ({})\nOverdue reviews: {} | Due soon: {} | Never reviewed: {}\n",
            self.total,
            statuses.join(", "),
            self.overdue,
            self.due_soon,
            self.never_reviewed
        ));
        if !self.findings.is_empty() {
            out.push_str("\nFINDINGS\n");
            for f in &self.findings {
                out.push_str(&format!("  - {f}\n"));
            }
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "id",
            "title",
            "doc_type",
            "version",
            "status",
            "owner",
            "next_review",
            "review_status",
            "version_valid",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|i| {
                vec![
                    i.document.id.clone(),
                    i.document.title.clone(),
                    i.document.doc_type.clone(),
                    i.document.version.clone(),
                    i.document.status.as_str().to_string(),
                    i.document.owner.clone().unwrap_or_default(),
                    i.next_review.map(|d| d.to_string()).unwrap_or_default(),
                    i.review_status.as_str().to_string(),
                    i.version_valid.to_string(),
                ]
            })
            .collect()
    }
}
