//! Sprint velocity statistics and delivery forecasting.

use crate::checks;
use crate::error::Result;
use crate::render::{fmt2, fmt_opt2, pct, round2, text_table, Report};
use serde::{Deserialize, Serialize};

/// Relative change between the recent and overall average that counts as a trend.
pub const TREND_THRESHOLD: f64 = 0.10;
const RECENT_WINDOW: usize = 3;

/// One completed sprint, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    pub committed: f64,
    pub completed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Flat,
    Down,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Flat => "flat",
            Trend::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SprintRow {
    #[serde(flatten)]
    pub sprint: Sprint,
    pub completion_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub scenario: &'static str,
    pub velocity: f64,
    pub sprints: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub remaining: f64,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SprintReport {
    pub sprints: usize,
    pub average_velocity: f64,
    pub recent_velocity: f64,
    pub std_dev: f64,
    pub reliability: Option<f64>,
    pub trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
    pub items: Vec<SprintRow>,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation; zero for fewer than two values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn trend(recent: f64, overall: f64) -> Trend {
    if overall <= 0.0 {
        return if recent > 0.0 { Trend::Up } else { Trend::Flat };
    }
    let change = (recent - overall) / overall;
    if change > TREND_THRESHOLD {
        Trend::Up
    } else if change < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Flat
    }
}

fn sprints_needed(remaining: f64, velocity: f64) -> Option<u64> {
    (velocity > 0.0).then(|| (remaining / velocity).ceil() as u64)
}

pub fn analyze(sprints: Vec<Sprint>, remaining: Option<f64>) -> Result<SprintReport> {
    for s in &sprints {
        checks::require_id(&s.name)?;
        checks::require_non_negative(&s.name, "committed", s.committed)?;
        checks::require_non_negative(&s.name, "completed", s.completed)?;
    }
    if let Some(r) = remaining {
        checks::require_non_negative("--remaining", "remaining", r)?;
    }

    let velocities: Vec<f64> = sprints.iter().map(|s| s.completed).collect();
    let avg = mean(&velocities);
    let recent = mean(&velocities[velocities.len().saturating_sub(RECENT_WINDOW)..]);
    let sd = std_dev(&velocities);
    let committed: f64 = sprints.iter().map(|s| s.committed).sum();
    let reliability = (committed > 0.0).then(|| velocities.iter().sum::<f64>() / committed);
    tracing::debug!(sprints = sprints.len(), avg, sd, "velocity computed");

    let forecast = remaining.map(|remaining| {
        let floor = velocities
            .iter()
            .copied()
            .filter(|v| *v > 0.0)
            .fold(f64::INFINITY, f64::min);
        let pessimistic = if floor.is_finite() { (avg - sd).max(floor) } else { avg - sd };
        let scenarios = [
            ("optimistic", avg + sd),
            ("expected", avg),
            ("pessimistic", pessimistic),
        ]
        .into_iter()
        .map(|(scenario, velocity)| Scenario {
            scenario,
            velocity: round2(velocity),
            sprints: sprints_needed(remaining, velocity),
        })
        .collect();
        Forecast { remaining, scenarios }
    });

    let items = sprints
        .into_iter()
        .map(|sprint| SprintRow {
            completion_rate: (sprint.committed > 0.0).then(|| sprint.completed / sprint.committed),
            sprint,
        })
        .collect::<Vec<_>>();

    Ok(SprintReport {
        sprints: items.len(),
        average_velocity: round2(avg),
        recent_velocity: round2(recent),
        std_dev: round2(sd),
        reliability: reliability.map(|r| (r * 10_000.0).round() / 10_000.0),
        trend: trend(recent, avg),
        forecast,
        items,
    })
}

impl Report for SprintReport {
    fn render_text(&self) -> String {
        let mut out = String::from("SPRINT VELOCITY\n\n");
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|r| {
                vec![
                    r.sprint.name.clone(),
                    fmt2(r.sprint.committed),
                    fmt2(r.sprint.completed),
                    pct(r.completion_rate),
                ]
            })
            .collect();
        out.push_str(&text_table(&["sprint", "committed", "completed", "done"], &rows));
        out.push_str(&format!(
            "\nAverage velocity: {} | Last {}: {} | Std dev: {}\nReliability: {} | Trend: {}\n",
            fmt2(self.average_velocity),
            RECENT_WINDOW.min(self.sprints),
            fmt2(self.recent_velocity),
            fmt2(self.std_dev),
            pct(self.reliability),
            self.trend.as_str()
        ));
        if let Some(f) = &self.forecast {
            out.push_str(&format!("\nFORECAST ({} points remaining)\n", fmt2(f.remaining)));
            let rows: Vec<Vec<String>> = f
                .scenarios
                .iter()
                .map(|s| {
                    vec![
                        s.scenario.to_string(),
                        fmt2(s.velocity),
                        s.sprints.map(|n| n.to_string()).unwrap_or_else(|| "n/a".to_string()),
                    ]
                })
                .collect();
            out.push_str(&text_table(&["scenario", "velocity", "sprints"], &rows));
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec!["name", "committed", "completed", "completion_rate"]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|r| {
                vec![
                    r.sprint.name.clone(),
                    fmt2(r.sprint.committed),
                    fmt2(r.sprint.completed),
                    fmt_opt2(r.completion_rate),
                ]
            })
            .collect()
    }
}
