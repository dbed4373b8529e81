// src/export/mod.rs

pub mod csv;

use crate::core::roster::Standing;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use chrono::NaiveDate;
use clap::ValueEnum;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// `points-tracker-YYYY-MM-DD.<ext>`, the name the web client downloads.
pub fn default_file_name(day: NaiveDate, format: ExportFormat) -> String {
    format!("points-tracker-{}.{}", day.format("%Y-%m-%d"), format.as_str())
}

/// Existing files are only replaced with `force`.
fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::Export(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Ok(())
}

pub fn export_standings(
    path: &Path,
    rows: &[Standing],
    format: ExportFormat,
    force: bool,
) -> AppResult<()> {
    ensure_writable(path, force)?;

    let out = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => csv::write_standings(out, rows)?,
        ExportFormat::Json => serde_json::to_writer_pretty(out, rows)
            .map_err(|e| AppError::Export(e.to_string()))?,
    }

    success(format!(
        "{} export completed: {} ({} students)",
        format.as_str().to_uppercase(),
        path.display(),
        rows.len()
    ));
    Ok(())
}
