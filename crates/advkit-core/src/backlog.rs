use crate::checks;
use crate::config::BacklogConfig;
use crate::error::{AdvkitError, Result};
use crate::render::{fmt2, round2, text_table, Report};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogItem {
    pub id: String,
    pub title: String,
    pub business_value: u8,
    pub time_criticality: u8,
    pub risk_reduction: u8,
    /// Relative size; any positive unit (points, days).
    pub job_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    #[default]
    Wsjf,
    Weighted,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Wsjf => "wsjf",
            Method::Weighted => "weighted",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Now,
    Next,
    Later,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Now => "now",
            Bucket::Next => "next",
            Bucket::Later => "later",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    pub rank: usize,
    #[serde(flatten)]
    pub item: BacklogItem,
    pub score: f64,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacklogReport {
    pub method: Method,
    pub now: usize,
    pub next: usize,
    pub later: usize,
    pub items: Vec<RankedItem>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Weighted Shortest Job First: cost of delay over job size.
pub fn wsjf(item: &BacklogItem) -> f64 {
    let cost_of_delay = f64::from(item.business_value)
        + f64::from(item.time_criticality)
        + f64::from(item.risk_reduction);
    cost_of_delay / item.job_size
}

/// Weighted mean of the three value dimensions, on the same 1-10 scale.
pub fn weighted(item: &BacklogItem, cfg: &BacklogConfig) -> f64 {
    let total = cfg.business_value_weight + cfg.time_criticality_weight + cfg.risk_reduction_weight;
    (cfg.business_value_weight * f64::from(item.business_value)
        + cfg.time_criticality_weight * f64::from(item.time_criticality)
        + cfg.risk_reduction_weight * f64::from(item.risk_reduction))
        / total
}

fn validate(items: &[BacklogItem]) -> Result<()> {
    for item in items {
        let id = item.id.as_str();
        checks::require_id(id)?;
        checks::require_scale(id, "business_value", item.business_value, 1, 10)?;
        checks::require_scale(id, "time_criticality", item.time_criticality, 1, 10)?;
        checks::require_scale(id, "risk_reduction", item.risk_reduction, 1, 10)?;
        checks::require_positive(id, "job_size", item.job_size)?;
    }
    checks::warn_duplicate_ids(items.iter().map(|i| i.id.as_str()));
    Ok(())
}

/// Bucket sizes for `n` ranked items; rounding up keeps small backlogs
/// from ending up with an empty "now".
fn bucket_sizes(n: usize, cfg: &BacklogConfig) -> (usize, usize) {
    let share = |fraction: f64| ((n as f64) * fraction - 1e-9).ceil().max(0.0) as usize;
    let now = share(cfg.now_fraction).min(n);
    (now, share(cfg.next_fraction).min(n - now))
}

pub fn prioritize(
    items: Vec<BacklogItem>,
    method: Method,
    cfg: &BacklogConfig,
) -> Result<BacklogReport> {
    validate(&items)?;
    if method == Method::Weighted {
        let total =
            cfg.business_value_weight + cfg.time_criticality_weight + cfg.risk_reduction_weight;
        if total <= 0.0 {
            return Err(AdvkitError::InvalidConfig(
                "backlog weights must sum to more than zero".to_string(),
            ));
        }
    }

    let mut scored: Vec<(f64, BacklogItem)> = items
        .into_iter()
        .map(|i| {
            let s = match method {
                Method::Wsjf => wsjf(&i),
                Method::Weighted => weighted(&i, cfg),
            };
            (s, i)
        })
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| sb.total_cmp(sa).then_with(|| a.id.cmp(&b.id)));

    let (now, next) = bucket_sizes(scored.len(), cfg);
    let later = scored.len() - now - next;
    let items = scored
        .into_iter()
        .enumerate()
        .map(|(idx, (s, item))| RankedItem {
            rank: idx + 1,
            item,
            score: round2(s),
            bucket: if idx < now {
                Bucket::Now
            } else if idx < now + next {
                Bucket::Next
            } else {
                Bucket::Later
            },
        })
        .collect();

    Ok(BacklogReport {
        method,
        now,
        next,
        later,
        items,
    })
}

impl Report for BacklogReport {
    fn render_text(&self) -> String {
        let mut out = format!("BACKLOG PRIORITIZATION ({})\n\n", self.method);
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|r| {
                vec![
                    r.rank.to_string(),
                    r.item.id.clone(),
                    r.item.title.clone(),
                    fmt2(r.score),
                    r.bucket.as_str().to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(&["rank", "id", "title", "score", "bucket"], &rows));
        out.push_str(&format!(
            "\nNow: {} | Next: {} | Later: {}\n",
            self.now, self.next, self.later
        ));
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "rank",
            "id",
            "title",
            "business_value",
            "time_criticality",
            "risk_reduction",
            "job_size",
            "score",
            "bucket",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|r| {
                vec![
                    r.rank.to_string(),
                    r.item.id.clone(),
                    r.item.title.clone(),
                    r.item.business_value.to_string(),
                    r.item.time_criticality.to_string(),
                    r.item.risk_reduction.to_string(),
                    r.item.job_size.to_string(),
                    fmt2(r.score),
                    r.bucket.as_str().to_string(),
                ]
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
