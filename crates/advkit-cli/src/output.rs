use advkit_core::io::atomic_write;
use advkit_core::render::{render, Report};
use advkit_core::AdvkitError;
use std::io::Write;
use std::path::Path;

use crate::cmd::Ctx;

/// Render `report` in the requested format and send it to stdout or `--file`.
pub fn emit<R: Report>(ctx: &Ctx, report: &R) -> anyhow::Result<()> {
    let rendered = render(report, ctx.format)?;
    write_output(ctx.file.as_deref(), &rendered)
}

pub fn write_output(file: Option<&Path>, rendered: &str) -> anyhow::Result<()> {
    match file {
        Some(path) => {
            atomic_write(path, rendered.as_bytes())?;
            eprintln!("Wrote {} bytes to {}", rendered.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|source| AdvkitError::OutputWrite {
                    path: "<stdout>".to_string(),
                    source,
                })?;
        }
    }
    Ok(())
}
