//! Brand voice analysis by keyword counting along paired dimensions.

use crate::error::{AdvkitError, Result};
use crate::render::{fmt2, round2, text_table, Report};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Scores inside (-LEAN, LEAN) are reported as balanced.
pub const LEAN: f64 = 0.2;
pub const BALANCED: &str = "balanced";

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"[a-z][a-z']*").unwrap())
}

pub struct Dimension {
    pub key: &'static str,
    pub pole_a: &'static str,
    pub pole_b: &'static str,
    pub words_a: &'static [&'static str],
    pub words_b: &'static [&'static str],
}

pub const DIMENSIONS: &[Dimension] = &[
    Dimension {
        key: "formality",
        pole_a: "formal",
        pole_b: "casual",
        words_a: &[
            "therefore", "furthermore", "moreover", "consequently", "regarding", "pursuant",
            "hereby", "accordingly", "shall", "nevertheless", "thus", "whereas", "additionally",
            "utilize", "commence",
        ],
        words_b: &[
            "hey", "awesome", "cool", "gonna", "wanna", "stuff", "yeah", "totally", "super",
            "kinda", "okay", "ok", "guys", "folks", "fun",
        ],
    },
    Dimension {
        key: "tone",
        pole_a: "authoritative",
        pole_b: "conversational",
        words_a: &[
            "must", "proven", "expert", "experts", "ensure", "guarantee", "leading", "research",
            "evidence", "certified", "require", "required", "standard", "industry",
        ],
        words_b: &[
            "let's", "imagine", "think", "feel", "maybe", "honestly", "chat", "talk", "share",
            "together", "just", "really",
        ],
    },
    Dimension {
        key: "sentiment",
        pole_a: "positive",
        pole_b: "negative",
        words_a: &[
            "great", "excellent", "easy", "love", "happy", "success", "best", "benefit", "improve",
            "win", "delight", "amazing", "simple", "fast",
        ],
        words_b: &[
            "problem", "difficult", "fail", "failure", "bad", "slow", "risk", "hard", "pain",
            "frustrating", "worst", "issue", "complex", "costly",
        ],
    },
    Dimension {
        key: "perspective",
        pole_a: "we_focused",
        pole_b: "you_focused",
        words_a: &["we", "our", "us", "ours", "we're", "we've"],
        words_b: &["you", "your", "yours", "you're", "you've"],
    },
];

fn dimension(key: &str) -> Option<&'static Dimension> {
    DIMENSIONS.iter().find(|d| d.key == key)
}

/// Parse a `dimension=pole` target such as `formality=formal`.
pub fn parse_target(s: &str) -> std::result::Result<(String, String), String> {
    let (key, pole) = s
        .split_once('=')
        .ok_or_else(|| format!("expected DIMENSION=POLE, got '{s}'"))?;
    let (key, pole) = (key.trim(), pole.trim());
    let dim = dimension(key).ok_or_else(|| {
        let keys: Vec<&str> = DIMENSIONS.iter().map(|d| d.key).collect();
        format!("unknown dimension '{key}' (expected one of: {})", keys.join(", "))
    })?;
    if pole != dim.pole_a && pole != dim.pole_b && pole != BALANCED {
        return Err(format!(
            "unknown pole '{pole}' for {key} (expected {}, {} or {BALANCED})",
            dim.pole_a, dim.pole_b
        ));
    }
    Ok((key.to_string(), pole.to_string()))
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionScore {
    pub dimension: &'static str,
    pub pole_a: &'static str,
    pub pole_b: &'static str,
    pub count_a: usize,
    pub count_b: usize,
    /// (a - b) / (a + b), 0 when neither pole appears.
    pub score: f64,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aligned: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceReport {
    pub words: usize,
    pub profile: Vec<&'static str>,
    pub aligned: Option<bool>,
    pub dimensions: Vec<DimensionScore>,
}

pub fn analyze(text: &str, targets: &[(String, String)]) -> Result<VoiceReport> {
    let lower = text.to_lowercase();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut words = 0;
    for m in token_re().find_iter(&lower) {
        words += 1;
        *counts.entry(m.as_str()).or_insert(0) += 1;
    }
    if words == 0 {
        return Err(AdvkitError::EmptyInput);
    }
    let hits = |list: &[&str]| {
        list.iter()
            .map(|w| counts.get(w).copied().unwrap_or(0))
            .sum::<usize>()
    };

    let target_map: HashMap<&str, &str> = targets
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let dimensions: Vec<DimensionScore> = DIMENSIONS
        .iter()
        .map(|d| {
            let (a, b) = (hits(d.words_a), hits(d.words_b));
            let score = if a + b == 0 {
                0.0
            } else {
                (a as f64 - b as f64) / (a + b) as f64
            };
            let label = if score >= LEAN {
                d.pole_a
            } else if score <= -LEAN {
                d.pole_b
            } else {
                BALANCED
            };
            let target = target_map.get(d.key).map(|t| t.to_string());
            let aligned = target.as_deref().map(|t| t == label);
            DimensionScore {
                dimension: d.key,
                pole_a: d.pole_a,
                pole_b: d.pole_b,
                count_a: a,
                count_b: b,
                score: round2(score),
                label,
                target,
                aligned,
            }
        })
        .collect();

    let aligned = if targets.is_empty() {
        None
    } else {
        Some(dimensions.iter().all(|d| d.aligned.unwrap_or(true)))
    };
    tracing::debug!(words, "voice analysed");
    Ok(VoiceReport {
        words,
        profile: dimensions.iter().map(|d| d.label).collect(),
        aligned,
        dimensions,
    })
}

impl Report for VoiceReport {
    fn render_text(&self) -> String {
        let mut out = String::from("BRAND VOICE ANALYSIS\n\n");
        let rows: Vec<Vec<String>> = self
            .dimensions
            .iter()
            .map(|d| {
                vec![
                    d.dimension.to_string(),
                    format!("{} {}", d.pole_a, d.count_a),
                    format!("{} {}", d.pole_b, d.count_b),
                    fmt2(d.score),
                    d.label.to_string(),
                    match (&d.target, d.aligned) {
                        (Some(t), Some(true)) => format!("{t} (aligned)"),
                        (Some(t), _) => format!("{t} (MISALIGNED)"),
                        _ => String::new(),
                    },
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["dimension", "pole a", "pole b", "score", "label", "target"],
            &rows,
        ));
        out.push_str(&format!(
            "\nWords: {} | Profile: {}\n",
            self.words,
            self.profile.join(", ")
        ));
        if let Some(aligned) = self.aligned {
            out.push_str(if aligned {
                "Voice matches all targets\n"
            } else {
                "Voice does not match every target\n"
            });
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "dimension", "pole_a", "count_a", "pole_b", "count_b", "score", "label", "target",
            "aligned",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.dimensions
            .iter()
            .map(|d| {
                vec![
                    d.dimension.to_string(),
                    d.pole_a.to_string(),
                    d.count_a.to_string(),
                    d.pole_b.to_string(),
                    d.count_b.to_string(),
                    fmt2(d.score),
                    d.label.to_string(),
                    d.target.clone().unwrap_or_default(),
                    d.aligned.map(|a| a.to_string()).unwrap_or_default(),
                ]
            })
            .collect()
    }
}
