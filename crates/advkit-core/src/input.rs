use crate::error::{AdvkitError, Result};
use crate::io::read_source;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Key under which every report nests its scored records. Loaders accept it
/// so one run's JSON report can be fed back in as the next run's input.
pub const REPORT_ITEMS_KEY: &str = "items";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Pick a format from the file extension, falling back to sniffing the
    /// first non-blank character of the content.
    pub fn detect(path: Option<&Path>, text: &str) -> InputFormat {
        let ext = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => InputFormat::Csv,
            Some("json") => InputFormat::Json,
            _ => match text.trim_start().chars().next() {
                Some('[') | Some('{') => InputFormat::Json,
                _ => InputFormat::Csv,
            },
        }
    }
}

/// Read and parse a list of records. `keys` are the object keys a JSON
/// document may hold the list under, tried in order before `items`.
pub fn load_records<T: DeserializeOwned>(path: Option<&Path>, keys: &[&str]) -> Result<Vec<T>> {
    let text = read_source(path)?;
    let format = InputFormat::detect(path, &text);
    let records: Vec<T> = parse_records(&text, format, keys)?;
    tracing::debug!(count = records.len(), ?format, "loaded records");
    Ok(records)
}

pub fn parse_records<T: DeserializeOwned>(
    text: &str,
    format: InputFormat,
    keys: &[&str],
) -> Result<Vec<T>> {
    let records = match format {
        InputFormat::Json => parse_json_records(text, keys)?,
        InputFormat::Csv => parse_csv_records(text)?,
    };
    if records.is_empty() {
        return Err(AdvkitError::EmptyInput);
    }
    Ok(records)
}

fn parse_json_records<T: DeserializeOwned>(text: &str, keys: &[&str]) -> Result<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let list = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => {
            let found = keys
                .iter()
                .copied()
                .chain(std::iter::once(REPORT_ITEMS_KEY))
                .find_map(|k| map.remove(k));
            match found {
                Some(list @ serde_json::Value::Array(_)) => list,
                _ => {
                    let mut expected: Vec<&str> = keys.to_vec();
                    expected.push(REPORT_ITEMS_KEY);
                    return Err(AdvkitError::UnsupportedFormat(format!(
                        "expected a JSON array or an object with an array under one of: {}",
                        expected.join(", ")
                    )));
                }
            }
        }
        _ => {
            return Err(AdvkitError::UnsupportedFormat(
                "expected a JSON array or object".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(list)?)
}

fn parse_csv_records<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut out = Vec::new();
    for row in reader.deserialize() {
        out.push(row?);
    }
    Ok(out)
}

/// Read a single structured document (JSON or YAML) such as a scaffold spec.
pub fn load_document<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let text = read_source(path)?;
    let is_json = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        // YAML is a superset of JSON, so sniffed stdin works either way.
        serde_yaml::from_str(&text).map_err(|e| {
            AdvkitError::UnsupportedFormat(format!("could not parse document: {e}"))
        })
    }
}

/// Read raw text for the text-analysis tools.
pub fn load_text(path: Option<&Path>) -> Result<String> {
    read_source(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
        value: f64,
        note: Option<String>,
    }

    #[test]
    fn detect_by_extension_then_content() {
        assert_eq!(
            InputFormat::detect(Some(Path::new("a.csv")), "[1]"),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::detect(Some(Path::new("a.json")), "id,value"),
            InputFormat::Json
        );
        assert_eq!(InputFormat::detect(None, "  \n[{}]"), InputFormat::Json);
        assert_eq!(InputFormat::detect(None, "id,value\n"), InputFormat::Csv);
    }

    #[test]
    fn json_array() {
        let rows: Vec<Row> =
            parse_records(r#"[{"id":"a","value":1.5}]"#, InputFormat::Json, &[]).unwrap();
        assert_eq!(rows[0].id, "a");
        assert!(rows[0].note.is_none());
    }

    #[test]
    fn json_object_with_domain_key() {
        let rows: Vec<Row> = parse_records(
            r#"{"meta":{},"risks":[{"id":"r","value":2}]}"#,
            InputFormat::Json,
            &["risks"],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn json_report_items_key_is_accepted() {
        let rows: Vec<Row> = parse_records(
            r#"{"summary":{"total":1},"items":[{"id":"x","value":3,"score":9}]}"#,
            InputFormat::Json,
            &["features"],
        )
        .unwrap();
        assert_eq!(rows[0].value, 3.0);
    }

    #[test]
    fn json_object_without_list_is_unsupported() {
        let err =
            parse_records::<Row>(r#"{"foo":1}"#, InputFormat::Json, &["risks"]).unwrap_err();
        assert!(matches!(err, AdvkitError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("risks, items"));
    }

    #[test]
    fn csv_rows_with_blank_optional() {
        let text = "id, value, note\na, 1, \nb, 2, hello\n";
        let rows: Vec<Row> = parse_records(text, InputFormat::Csv, &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].note, None);
        assert_eq!(rows[1].note.as_deref(), Some("hello"));
    }

    #[test]
    fn empty_array_is_empty_input() {
        let err = parse_records::<Row>("[]", InputFormat::Json, &[]).unwrap_err();
        assert!(matches!(err, AdvkitError::EmptyInput));
    }

    #[test]
    fn bad_csv_value_is_malformed() {
        let err =
            parse_records::<Row>("id,value\na,notanumber\n", InputFormat::Csv, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
