//! Table serialization to CSV, JSON and Markdown.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{OutputFormat, OutputTarget};
use crate::error::{AnalyzerError, Result};
use crate::report::table::{Table, cell_text};

/// Directory default-named reports are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "results";
/// File stem of default-named reports, e.g. `2024_03_01-02_15_09_PM`.
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d-%I_%M_%S_%p";

pub fn render(table: &Table, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => Ok(render_csv(table)),
        OutputFormat::Json => render_json(table),
        OutputFormat::Markdown => Ok(render_markdown(table)),
    }
}

fn render_csv(table: &Table) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, table.columns.iter().map(String::as_str));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        push_csv_line(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = fields.map(csv_field).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render_json(table: &Table) -> Result<String> {
    let objects: Vec<Value> = table.to_objects().into_iter().map(Value::Object).collect();
    serde_json::to_string_pretty(&objects).map_err(|e| AnalyzerError::Output(e.to_string()))
}

fn render_markdown(table: &Table) -> String {
    let cell = |s: &str| s.replace('|', "\\|").replace(['\n', '\r'], " ");

    let mut out = String::new();
    let header: Vec<String> = table.columns.iter().map(|c| cell(c)).collect();
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!("|{}\n", " --- |".repeat(table.columns.len())));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|v| cell(&cell_text(v))).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

/// Format used for `target`: an explicit choice wins, then the extension of
/// an explicit path; stdout defaults to Markdown and files to CSV.
pub fn resolve_format(explicit: Option<OutputFormat>, target: &OutputTarget) -> OutputFormat {
    if let Some(format) = explicit {
        return format;
    }
    match target {
        OutputTarget::Path(path) => OutputFormat::from_path(path).unwrap_or_default(),
        OutputTarget::Suppressed => OutputFormat::Markdown,
        OutputTarget::Default => OutputFormat::default(),
    }
}

/// `<dir>/<timestamp>.<ext>`.
pub fn default_output_path(dir: &Path, now: DateTime<Local>, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", now.format(TIMESTAMP_FORMAT), format.extension()))
}

/// Append the format's extension unless the path already carries it.
pub fn with_extension(path: &Path, format: OutputFormat) -> PathBuf {
    if OutputFormat::from_path(path) == Some(format) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// `out.csv` with suffix `markers` becomes `out_markers.csv`.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(name)
}

/// Write one table to `path`, creating the parent directory. An existing
/// file is overwritten.
pub fn write_table(table: &Table, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            debug!(dir = %parent.display(), "Creating output directory");
            fs::create_dir_all(parent)?;
        }
    }
    if path.exists() {
        warn!(path = %path.display(), "Output file exists, overwriting it");
    }
    fs::write(path, render(table, format)?)?;
    info!(path = %path.display(), rows = table.len(), %format, "Wrote report");
    Ok(())
}

/// Emit a report made of one primary table and optional named secondary
/// tables.
///
/// Files: the primary table goes to the target path, each secondary one to
/// a sibling path suffixed with its name. Stdout: all tables are printed in
/// order. Returns the files written.
pub fn write_report(
    primary: &Table,
    secondary: &[(&str, &Table)],
    target: &OutputTarget,
    explicit_format: Option<OutputFormat>,
) -> Result<Vec<PathBuf>> {
    let format = resolve_format(explicit_format, target);
    let path = match target {
        OutputTarget::Suppressed => {
            println!("{}", render(primary, format)?);
            for (name, table) in secondary {
                println!("{name}\n\n{}", render(table, format)?);
            }
            return Ok(Vec::new());
        }
        OutputTarget::Default => default_output_path(Path::new(DEFAULT_OUTPUT_DIR), Local::now(), format),
        OutputTarget::Path(path) => with_extension(path, format),
    };

    let mut written = vec![path.clone()];
    write_table(primary, &path, format)?;
    for (name, table) in secondary {
        let sibling = sibling_path(&path, name);
        write_table(table, &sibling, format)?;
        written.push(sibling);
    }
    Ok(written)
}
