use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
    Csv,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A computed result that can be printed in every output format.
///
/// JSON is the serde form of the report itself. CSV is one row per scored
/// record; summary figures only appear in the text and JSON forms.
pub trait Report: Serialize {
    fn render_text(&self) -> String;
    fn csv_header(&self) -> Vec<&'static str>;
    fn csv_rows(&self) -> Vec<Vec<String>>;
}

pub fn render<R: Report>(report: &R, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(report.render_text()),
        Format::Json => {
            let mut s = serde_json::to_string_pretty(report)?;
            s.push('\n');
            Ok(s)
        }
        Format::Csv => render_csv(&report.csv_header(), report.csv_rows()),
    }
}

fn render_csv(header: &[&str], rows: Vec<Vec<String>>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::AdvkitError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Column-aligned table with a dashed separator under the header.
pub fn text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    out.push_str(header_row.join("  ").trim_end());
    out.push('\n');

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&sep.join("  "));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Fixed two-decimal rendering used in tables and CSV.
pub fn fmt2(v: f64) -> String {
    format!("{v:.2}")
}

pub fn fmt_opt2(v: Option<f64>) -> String {
    v.map(fmt2).unwrap_or_else(|| "n/a".to_string())
}

pub fn pct(v: Option<f64>) -> String {
    v.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Demo {
        rows: Vec<(String, u32)>,
    }

    impl Report for Demo {
        fn render_text(&self) -> String {
            let rows: Vec<Vec<String>> = self
                .rows
                .iter()
                .map(|(n, v)| vec![n.clone(), v.to_string()])
                .collect();
            text_table(&["name", "value"], &rows)
        }
        fn csv_header(&self) -> Vec<&'static str> {
            vec!["name", "value"]
        }
        fn csv_rows(&self) -> Vec<Vec<String>> {
            self.rows
                .iter()
                .map(|(n, v)| vec![n.clone(), v.to_string()])
                .collect()
        }
    }

    fn demo() -> Demo {
        Demo {
            rows: vec![("alpha".into(), 1), ("b, with comma".into(), 22)],
        }
    }

    #[test]
    fn text_table_aligns_columns() {
        let out = render(&demo(), Format::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "name           value");
        assert!(lines[1].starts_with("-------------  -----"));
        assert_eq!(lines[2], "alpha          1");
    }

    #[test]
    fn csv_quotes_commas() {
        let out = render(&demo(), Format::Csv).unwrap();
        assert_eq!(out, "name,value\nalpha,1\n\"b, with comma\",22\n");
    }

    #[test]
    fn json_is_pretty_with_trailing_newline() {
        let out = render(&demo(), Format::Json).unwrap();
        assert!(out.ends_with("}\n"));
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["rows"][1][1], 22);
    }

    #[test]
    fn number_helpers() {
        assert_eq!(fmt2(1.0 / 3.0), "0.33");
        assert_eq!(fmt_opt2(None), "n/a");
        assert_eq!(pct(Some(0.1234)), "12.3%");
        assert_eq!(round2(2.345_6), 2.35);
    }
}
