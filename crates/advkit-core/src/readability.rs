use crate::config::ReadabilityConfig;
use crate::error::{AdvkitError, Result};
use crate::render::{fmt2, Report};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

static WORD_RE: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END_RE: OnceLock<Regex> = OnceLock::new();
static PASSIVE_RE: OnceLock<Regex> = OnceLock::new();

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").unwrap())
}

fn sentence_end_re() -> &'static Regex {
    SENTENCE_END_RE.get_or_init(|| Regex::new(r"[.!?]+").unwrap())
}

fn passive_re() -> &'static Regex {
    PASSIVE_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(am|is|are|was|were|be|been|being)\s+[a-z]+(ed|en)\b").unwrap()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingLevel {
    VeryEasy,
    Easy,
    FairlyEasy,
    Standard,
    FairlyDifficult,
    Difficult,
    VeryConfusing,
}

impl ReadingLevel {
    pub fn from_ease(score: f64) -> ReadingLevel {
        match score {
            s if s >= 90.0 => ReadingLevel::VeryEasy,
            s if s >= 80.0 => ReadingLevel::Easy,
            s if s >= 70.0 => ReadingLevel::FairlyEasy,
            s if s >= 60.0 => ReadingLevel::Standard,
            s if s >= 50.0 => ReadingLevel::FairlyDifficult,
            s if s >= 30.0 => ReadingLevel::Difficult,
            _ => ReadingLevel::VeryConfusing,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingLevel::VeryEasy => "very_easy",
            ReadingLevel::Easy => "easy",
            ReadingLevel::FairlyEasy => "fairly_easy",
            ReadingLevel::Standard => "standard",
            ReadingLevel::FairlyDifficult => "fairly_difficult",
            ReadingLevel::Difficult => "difficult",
            ReadingLevel::VeryConfusing => "very_confusing",
        }
    }
}

/// Vowel-group syllable estimate with a silent trailing `e`.
pub fn syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if letters.is_empty() {
        return 0;
    }
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    let n = letters.len();
    if count > 1 && n > 2 && letters[n - 1] == 'e' {
        let before = letters[n - 2];
        if !is_vowel(before) && before != 'l' {
            count -= 1;
        }
    }
    count.max(1)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadabilityReport {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    pub complex_words: usize,
    pub avg_sentence_length: f64,
    pub avg_syllables_per_word: f64,
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
    pub level: ReadingLevel,
    pub passive_voice: usize,
    pub long_sentences: usize,
    pub recommendations: Vec<String>,
}

fn r2(v: f64) -> f64 {
    crate::render::round2(v)
}

pub fn analyze(text: &str, cfg: &ReadabilityConfig) -> Result<ReadabilityReport> {
    let mut sentence_lengths: Vec<usize> = sentence_end_re()
        .split(text)
        .map(|s| word_re().find_iter(s).count())
        .filter(|&n| n > 0)
        .collect();

    let words: Vec<&str> = word_re().find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return Err(AdvkitError::EmptyInput);
    }
    if sentence_lengths.is_empty() {
        sentence_lengths.push(words.len());
    }

    let w = words.len() as f64;
    let s = sentence_lengths.len() as f64;
    let syllable_counts: Vec<usize> = words.iter().map(|w| syllables(w)).collect();
    let syl: usize = syllable_counts.iter().sum();
    let complex = syllable_counts.iter().filter(|&&n| n >= 3).count();

    let wps = w / s;
    let spw = syl as f64 / w;
    let ease = 206.835 - 1.015 * wps - 84.6 * spw;
    let grade = 0.39 * wps + 11.8 * spw - 15.59;
    let fog = 0.4 * (wps + 100.0 * complex as f64 / w);

    let passive = passive_re().find_iter(text).count();
    let long = sentence_lengths
        .iter()
        .filter(|&&n| n > cfg.long_sentence_words)
        .count();

    let mut recommendations = Vec::new();
    if wps > 20.0 {
        recommendations.push(format!(
            "Shorten sentences: average is {:.1} words (aim for 15-20)",
            wps
        ));
    }
    if long > 0 {
        recommendations.push(format!(
            "Split {long} sentence(s) longer than {} words",
            cfg.long_sentence_words
        ));
    }
    if passive as f64 / s > 0.1 {
        recommendations.push(format!(
            "Prefer active voice: {passive} passive construction(s) found"
        ));
    }
    if complex as f64 / w > 0.15 {
        recommendations.push(format!(
            "Replace complex words: {:.1}% of words have three or more syllables",
            complex as f64 / w * 100.0
        ));
    }
    if ease < 60.0 {
        recommendations
            .push("Simplify vocabulary to reach a reading ease of 60 or more".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Readability is within target ranges".to_string());
    }

    tracing::debug!(
        words = words.len(),
        sentences = sentence_lengths.len(),
        "readability analysed"
    );
    Ok(ReadabilityReport {
        sentences: sentence_lengths.len(),
        words: words.len(),
        syllables: syl,
        complex_words: complex,
        avg_sentence_length: r2(wps),
        avg_syllables_per_word: r2(spw),
        flesch_reading_ease: r2(ease),
        flesch_kincaid_grade: r2(grade),
        gunning_fog: r2(fog),
        level: ReadingLevel::from_ease(ease),
        passive_voice: passive,
        long_sentences: long,
        recommendations,
    })
}

impl ReadabilityReport {
    fn metrics(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sentences", self.sentences.to_string()),
            ("words", self.words.to_string()),
            ("syllables", self.syllables.to_string()),
            ("complex_words", self.complex_words.to_string()),
            ("avg_sentence_length", fmt2(self.avg_sentence_length)),
            ("avg_syllables_per_word", fmt2(self.avg_syllables_per_word)),
            ("flesch_reading_ease", fmt2(self.flesch_reading_ease)),
            ("flesch_kincaid_grade", fmt2(self.flesch_kincaid_grade)),
            ("gunning_fog", fmt2(self.gunning_fog)),
            ("level", self.level.as_str().to_string()),
            ("passive_voice", self.passive_voice.to_string()),
            ("long_sentences", self.long_sentences.to_string()),
        ]
    }
}

impl Report for ReadabilityReport {
    fn render_text(&self) -> String {
        let mut out = String::from("READABILITY ANALYSIS\n\n");
        for (k, v) in self.metrics() {
            out.push_str(&format!("  {:<24} {}\n", k, v));
        }
        out.push_str("\nRECOMMENDATIONS\n");
        for r in &self.recommendations {
            out.push_str(&format!("  - {r}\n"));
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec!["metric", "value"]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.metrics()
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllable_heuristic() {
        assert_eq!(syllables("the"), 1);
        assert_eq!(syllables("make"), 1);
        assert_eq!(syllables("table"), 2);
        assert_eq!(syllables("beautiful"), 3);
        assert_eq!(syllables("readability"), 5);
        assert_eq!(syllables("rhythm"), 1);
        assert_eq!(syllables("Queue"), 1);
    }

    #[test]
    fn simple_text_metrics() {
        let report = analyze("The cat sat on the mat. The dog ran.", &ReadabilityConfig::default())
            .unwrap();
        assert_eq!(report.sentences, 2);
        assert_eq!(report.words, 9);
        assert_eq!(report.syllables, 9);
        assert_eq!(report.avg_sentence_length, 4.5);
        assert_eq!(report.flesch_reading_ease, 117.67);
        assert!((report.flesch_kincaid_grade + 2.035).abs() < 0.01);
        assert_eq!(report.level, ReadingLevel::VeryEasy);
        assert_eq!(report.recommendations, vec!["Readability is within target ranges"]);
    }

    #[test]
    fn passive_and_long_sentences() {
        let cfg = ReadabilityConfig {
            long_sentence_words: 5,
        };
        let report = analyze(
            "The report was written by the committee after many long meetings. It is done.",
            &cfg,
        )
        .unwrap();
        assert_eq!(report.passive_voice, 1);
        assert_eq!(report.long_sentences, 1);
        assert!(report.recommendations.iter().any(|r| r.contains("active voice")));
    }

    #[test]
    fn text_without_terminator_is_one_sentence() {
        let report = analyze("just a fragment", &ReadabilityConfig::default()).unwrap();
        assert_eq!(report.sentences, 1);
        assert_eq!(report.words, 3);
    }

    #[test]
    fn empty_text_rejected() {
        let err = analyze("  ... !! ", &ReadabilityConfig::default()).unwrap_err();
        assert!(matches!(err, AdvkitError::EmptyInput));
    }

    #[test]
    fn levels() {
        assert_eq!(ReadingLevel::from_ease(65.0), ReadingLevel::Standard);
        assert_eq!(ReadingLevel::from_ease(10.0), ReadingLevel::VeryConfusing);
    }
}
