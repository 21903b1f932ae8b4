use crate::checks;
use crate::config::RiceConfig;
use crate::error::Result;
use crate::render::{fmt2, round2, text_table, Report};
use serde::{Deserialize, Serialize};

/// Conventional RICE impact scale: minimal, low, medium, high, massive.
pub const STANDARD_IMPACTS: [f64; 5] = [0.25, 0.5, 1.0, 2.0, 3.0];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiceItem {
    pub id: String,
    pub name: String,
    /// People or events per period.
    pub reach: f64,
    pub impact: f64,
    /// Fraction in (0, 1]; percentages are normalised on load.
    pub confidence: f64,
    /// Person-months.
    pub effort: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    QuickWin,
    BigBet,
    FillIn,
    MoneyPit,
}

impl Quadrant {
    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::QuickWin => "quick_win",
            Quadrant::BigBet => "big_bet",
            Quadrant::FillIn => "fill_in",
            Quadrant::MoneyPit => "money_pit",
        }
    }

    pub fn classify(item: &RiceItem, cfg: &RiceConfig) -> Quadrant {
        let high_impact = item.impact >= cfg.high_impact;
        let low_effort = item.effort <= cfg.low_effort;
        match (high_impact, low_effort) {
            (true, true) => Quadrant::QuickWin,
            (true, false) => Quadrant::BigBet,
            (false, true) => Quadrant::FillIn,
            (false, false) => Quadrant::MoneyPit,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ScoredRiceItem {
    pub rank: usize,
    #[serde(flatten)]
    pub item: RiceItem,
    pub score: f64,
    pub quadrant: Quadrant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityPlan {
    pub capacity: f64,
    pub used: f64,
    pub remaining: f64,
    pub selected_count: usize,
    pub selected_score: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuadrantCounts {
    pub quick_win: usize,
    pub big_bet: usize,
    pub fill_in: usize,
    pub money_pit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiceSummary {
    pub total_items: usize,
    pub total_effort: f64,
    pub quadrants: QuadrantCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiceReport {
    pub summary: RiceSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityPlan>,
    pub items: Vec<ScoredRiceItem>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

pub fn score(item: &RiceItem) -> f64 {
    item.reach * item.impact * item.confidence / item.effort
}

/// Validate every item, normalising percentage confidences in place.
pub fn validate(items: &mut [RiceItem]) -> Result<()> {
    for item in items.iter_mut() {
        let id = item.id.as_str();
        checks::require_id(id)?;
        checks::require_non_negative(id, "reach", item.reach)?;
        checks::require_positive(id, "impact", item.impact)?;
        checks::require_positive(id, "effort", item.effort)?;
        item.confidence = checks::normalize_fraction(id, "confidence", item.confidence)?;
        checks::require_positive(id, "confidence", item.confidence)?;
        if !STANDARD_IMPACTS.contains(&item.impact) {
            tracing::warn!(record = id, impact = item.impact, "non-standard impact value");
        }
    }
    checks::warn_duplicate_ids(items.iter().map(|i| i.id.as_str()));
    Ok(())
}

/// Score, rank and (optionally) fill a capacity budget greedily by rank.
pub fn prioritize(
    mut items: Vec<RiceItem>,
    capacity: Option<f64>,
    cfg: &RiceConfig,
) -> Result<RiceReport> {
    validate(&mut items)?;
    if let Some(c) = capacity {
        checks::require_positive("capacity", "capacity", c)?;
    }

    let mut scored: Vec<(f64, RiceItem)> = items.into_iter().map(|i| (score(&i), i)).collect();
    scored.sort_by(|(sa, a), (sb, b)| sb.total_cmp(sa).then_with(|| a.id.cmp(&b.id)));

    let mut quadrants = QuadrantCounts::default();
    let mut total_effort = 0.0;
    let mut remaining = capacity.unwrap_or(0.0);
    let mut selected_count = 0;
    let mut selected_score = 0.0;

    let mut out = Vec::with_capacity(scored.len());
    for (idx, (raw, item)) in scored.into_iter().enumerate() {
        let quadrant = Quadrant::classify(&item, cfg);
        match quadrant {
            Quadrant::QuickWin => quadrants.quick_win += 1,
            Quadrant::BigBet => quadrants.big_bet += 1,
            Quadrant::FillIn => quadrants.fill_in += 1,
            Quadrant::MoneyPit => quadrants.money_pit += 1,
        }
        total_effort += item.effort;

        let selected = capacity.map(|_| {
            let fits = item.effort <= remaining + f64::EPSILON;
            if fits {
                remaining -= item.effort;
                selected_count += 1;
                selected_score += raw;
            }
            fits
        });

        out.push(ScoredRiceItem {
            rank: idx + 1,
            item,
            score: round2(raw),
            quadrant,
            selected,
        });
    }

    let capacity = capacity.map(|c| CapacityPlan {
        capacity: c,
        used: round2(c - remaining),
        remaining: round2(remaining),
        selected_count,
        selected_score: round2(selected_score),
    });
    tracing::debug!(items = out.len(), "rice prioritisation complete");

    Ok(RiceReport {
        summary: RiceSummary {
            total_items: out.len(),
            total_effort: round2(total_effort),
            quadrants,
        },
        capacity,
        items: out,
    })
}

impl Report for RiceReport {
    fn render_text(&self) -> String {
        let mut out = String::from("RICE PRIORITIZATION\n\n");
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|s| {
                let mut row = vec![
                    s.rank.to_string(),
                    s.item.id.clone(),
                    s.item.name.clone(),
                    fmt2(s.score),
                    s.quadrant.as_str().to_string(),
                    fmt2(s.item.effort),
                ];
                if let Some(sel) = s.selected {
                    row.push(if sel { "yes" } else { "no" }.to_string());
                }
                row
            })
            .collect();
        let mut headers = vec!["rank", "id", "name", "score", "quadrant", "effort"];
        if self.capacity.is_some() {
            headers.push("selected");
        }
        out.push_str(&text_table(&headers, &rows));

        let q = &self.summary.quadrants;
        out.push_str(&format!(
            "\nItems: {} | Total effort: {}\nQuick wins: {} | Big bets: {} | Fill-ins: {} | Money pits: {}\n",
            self.summary.total_items,
            fmt2(self.summary.total_effort),
            q.quick_win,
            q.big_bet,
            q.fill_in,
            q.money_pit,
        ));
        if let Some(plan) = &self.capacity {
            out.push_str(&format!(
                "Capacity: {} used of {} ({} remaining), {} item(s) selected\n",
                fmt2(plan.used),
                fmt2(plan.capacity),
                fmt2(plan.remaining),
                plan.selected_count,
            ));
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "rank", "id", "name", "reach", "impact", "confidence", "effort", "score", "quadrant",
            "selected",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|s| {
                vec![
                    s.rank.to_string(),
                    s.item.id.clone(),
                    s.item.name.clone(),
                    s.item.reach.to_string(),
                    s.item.impact.to_string(),
                    s.item.confidence.to_string(),
                    s.item.effort.to_string(),
                    fmt2(s.score),
                    s.quadrant.as_str().to_string(),
                    s.selected.map(|b| b.to_string()).unwrap_or_default(),
                ]
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
