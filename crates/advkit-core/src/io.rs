use crate::error::{AdvkitError, Result};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// A failed write never leaves a truncated report behind.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    write_inner(path, data).map_err(|source| AdvkitError::OutputWrite {
        path: path.display().to_string(),
        source,
    })
}

fn write_inner(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read the whole input: a file path, or stdin when `path` is `None` or `-`.
pub fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            if !p.exists() {
                return Err(AdvkitError::InputNotFound(p.display().to_string()));
            }
            let text = std::fs::read_to_string(p)
                .map_err(|e| read_error(e, &p.display().to_string()))?;
            tracing::debug!(path = %p.display(), bytes = text.len(), "read input file");
            Ok(text)
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| read_error(e, "<stdin>"))?;
            tracing::debug!(bytes = text.len(), "read input from stdin");
            Ok(text)
        }
    }
}

/// Undecodable bytes are bad input data, not an I/O failure.
fn read_error(e: std::io::Error, source: &str) -> AdvkitError {
    if e.kind() == ErrorKind::InvalidData {
        AdvkitError::UnsupportedFormat(format!("{source} is not valid UTF-8 text"))
    } else {
        AdvkitError::Io(e)
    }
}
