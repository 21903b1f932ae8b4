//! Boilerplate generators.
//!
//! Each generator takes a small JSON/YAML spec and returns the files it would
//! create as a `ScaffoldReport`. Nothing touches the filesystem unless the
//! caller asks for `write_files`.

pub mod csharp;
pub mod java;
pub mod k8s;
pub mod terraform;

use crate::error::{AdvkitError, Result};
use crate::io::atomic_write;
use crate::render::Report;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static IDENT_RE: OnceLock<Regex> = OnceLock::new();
static TYPE_RE: OnceLock<Regex> = OnceLock::new();

fn ident_re() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

fn type_re() -> &'static Regex {
    TYPE_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.<>,\[\]? ]*$").unwrap())
}

// ---------------------------------------------------------------------------
// Shared spec pieces
// ---------------------------------------------------------------------------

/// A typed member of a generated class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

pub fn require_identifier(what: &str, name: &str) -> Result<()> {
    if !ident_re().is_match(name) {
        return Err(AdvkitError::invalid(
            name,
            format!("{what} must match [A-Za-z_][A-Za-z0-9_]*"),
        ));
    }
    Ok(())
}

/// Dotted identifier such as a Java package or C# namespace.
pub fn require_qualified(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || !name.split('.').all(|part| ident_re().is_match(part)) {
        return Err(AdvkitError::invalid(
            name,
            format!("{what} must be dot-separated identifiers"),
        ));
    }
    Ok(())
}

/// Field names must be identifiers, unique, and carry a plausible type.
pub fn validate_fields(fields: &[Field]) -> Result<()> {
    let mut seen = HashSet::new();
    for f in fields {
        require_identifier("field name", &f.name)?;
        if !type_re().is_match(f.ty.trim()) {
            return Err(AdvkitError::invalid(&f.name, format!("invalid type '{}'", f.ty)));
        }
        if !seen.insert(f.name.to_lowercase()) {
            return Err(AdvkitError::invalid(&f.name, "duplicate field name"));
        }
    }
    Ok(())
}

/// `first_name` / `firstName` -> `FirstName`.
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `first_name` / `FirstName` -> `firstName`.
pub fn camel_case(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(c) => c.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        GeneratedFile {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn lines(&self) -> usize {
        self.content.lines().count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaffoldReport {
    pub generator: &'static str,
    pub files: Vec<GeneratedFile>,
}

impl Report for ScaffoldReport {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for (i, f) in self.files.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("// ---- {} ----\n", f.path));
            out.push_str(&f.content);
            if !f.content.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec!["path", "lines"]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.files
            .iter()
            .map(|f| vec![f.path.clone(), f.lines().to_string()])
            .collect()
    }
}

/// Write every generated file below `out_dir`, atomically per file.
pub fn write_files(report: &ScaffoldReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(report.files.len());
    for f in &report.files {
        let path = out_dir.join(&f.path);
        atomic_write(&path, f.content.as_bytes())?;
        tracing::debug!(path = %path.display(), "scaffold file written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn identifier_rules() {
        assert!(require_identifier("class name", "Customer_2").is_ok());
        assert!(require_identifier("class name", "_x").is_ok());
        assert!(require_identifier("class name", "2fast").is_err());
        assert!(require_identifier("class name", "has-dash").is_err());
        assert!(require_qualified("package", "com.example.app").is_ok());
        assert!(require_qualified("package", "com..example").is_err());
    }

    #[test]
    fn case_conversion() {
        assert_eq!(pascal_case("first_name"), "FirstName");
        assert_eq!(pascal_case("firstName"), "FirstName");
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("Id"), "id");
    }

    #[test]
    fn duplicate_fields_rejected() {
        let fields = vec![
            Field { name: "id".into(), ty: "long".into() },
            Field { name: "ID".into(), ty: "long".into() },
        ];
        assert!(validate_fields(&fields).is_err());
        let bad_type = vec![Field { name: "x".into(), ty: "int;".into() }];
        assert!(validate_fields(&bad_type).is_err());
        let generic = vec![Field { name: "tags".into(), ty: "List<String>".into() }];
        assert!(validate_fields(&generic).is_ok());
    }

    #[test]
    fn text_and_csv_rendering() {
        let report = ScaffoldReport {
            generator: "test",
            files: vec![
                GeneratedFile::new("a.txt", "one\ntwo\n"),
                GeneratedFile::new("b.txt", "three"),
            ],
        };
        let text = report.render_text();
        assert!(text.starts_with("// ---- a.txt ----\none\ntwo\n\n// ---- b.txt ----\nthree\n"));
        assert_eq!(
            report.csv_rows(),
            vec![
                vec!["a.txt".to_string(), "2".to_string()],
                vec!["b.txt".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn write_files_creates_nested_paths() {
        let dir = TempDir::new().unwrap();
        let report = ScaffoldReport {
            generator: "test",
            files: vec![GeneratedFile::new("nested/dir/x.txt", "hello\n")],
        };
        let written = write_files(&report, dir.path()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "hello\n");
    }
}
