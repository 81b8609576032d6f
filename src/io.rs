//! CSV loaders for the price base and the project file, plus the
//! three-sheet report writer.
//!
//! Column names follow the historical data contract: the price base
//! carries `descripcion`, `unidad`, `precio_unitario`; the project file
//! carries `descripcion_proyecto`, `unidad` and optionally `cantidad`.
//! Headers are normalized before lookup, so `Precio Unitario` or
//! `DESCRIPCIÓN` resolve fine. Missing required columns are fatal;
//! missing cell values resolve to documented defaults (price absent,
//! quantity 1.0) so no nullable numeric reaches the scoring pipeline.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use matcher::{BaseItem, Decision, MatchReport, ProjectItem};
use normalize::{normalize_text, UnitAliases};
use thiserror::Error;

/// Errors raised while reading inputs or writing the report.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required columns: {missing:?}")]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const BASE_COLUMNS: [&str; 3] = ["descripcion", "unidad", "precio_unitario"];
const PROJECT_COLUMNS: [&str; 2] = ["descripcion_proyecto", "unidad"];

/// Reads the price-base catalog. Normalized fields are populated here,
/// before matching ever sees the rows.
pub fn read_price_base(path: &Path, aliases: &UnitAliases) -> Result<Vec<BaseItem>, IoError> {
    let (headers, records) = read_table(path)?;
    let columns = require_columns(path, &headers, &BASE_COLUMNS)?;

    let items = records
        .iter()
        .map(|record| {
            let description = cell(record, columns["descripcion"]);
            let unit = cell(record, columns["unidad"]);
            let price = parse_float(&cell(record, columns["precio_unitario"]));
            BaseItem::new(description, unit, price, aliases)
        })
        .collect();
    Ok(items)
}

/// Reads the project file. The `cantidad` column is optional; absent or
/// unparseable quantities coerce to 1.0 inside [`ProjectItem::new`].
pub fn read_project_file(path: &Path, aliases: &UnitAliases) -> Result<Vec<ProjectItem>, IoError> {
    let (headers, records) = read_table(path)?;
    let columns = require_columns(path, &headers, &PROJECT_COLUMNS)?;
    let quantity_column = columns.get("cantidad").copied();

    let items = records
        .iter()
        .map(|record| {
            let description = cell(record, columns["descripcion_proyecto"]);
            let unit = cell(record, columns["unidad"]);
            let quantity = quantity_column.and_then(|idx| parse_float(&cell(record, idx)));
            ProjectItem::new(description, unit, quantity, aliases)
        })
        .collect();
    Ok(items)
}

/// Writes the report: `valorado.csv` (every row), `pendientes.csv`
/// (non-auto rows) and `candidatos.csv` (review shortlist, skipped
/// entirely when the shortlist is empty).
pub fn write_report(
    dir: &Path,
    project: &[ProjectItem],
    report: &MatchReport,
) -> Result<(), IoError> {
    fs::create_dir_all(dir).map_err(|source| IoError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    write_outcomes(&dir.join("valorado.csv"), project, report, |_| true)?;
    write_outcomes(&dir.join("pendientes.csv"), project, report, |decision| {
        decision != Decision::Auto
    })?;

    if !report.shortlist.is_empty() {
        write_shortlist(&dir.join("candidatos.csv"), report)?;
    }
    Ok(())
}

fn write_outcomes(
    path: &Path,
    project: &[ProjectItem],
    report: &MatchReport,
    keep: impl Fn(Decision) -> bool,
) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };

    writer
        .write_record([
            "descripcion_proyecto",
            "unidad",
            "cantidad",
            "match_score",
            "descripcion_base_asignada",
            "unidad_base",
            "precio_unitario_asignado",
            "unidad_compatible",
            "decision",
            "importe",
        ])
        .map_err(write_err)?;

    for (item, outcome) in project.iter().zip(&report.outcomes) {
        if !keep(outcome.decision) {
            continue;
        }
        writer
            .write_record([
                item.description.as_str(),
                item.unit.as_str(),
                &item.quantity.to_string(),
                &outcome.score.to_string(),
                outcome.base_description.as_str(),
                outcome.base_unit.as_str(),
                &outcome.unit_price.to_string(),
                &outcome.unit_compatible.to_string(),
                outcome.decision.as_str(),
                &outcome.extended_amount.to_string(),
            ])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source: source.into(),
    })
}

fn write_shortlist(path: &Path, report: &MatchReport) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };

    writer
        .write_record([
            "fila_proyecto",
            "descripcion_proyecto",
            "descripcion_base",
            "unidad_base",
            "precio_unitario",
            "score",
            "unidad_compatible",
        ])
        .map_err(write_err)?;

    for candidate in &report.shortlist {
        writer
            .write_record([
                &candidate.project_row.to_string(),
                candidate.project_description.as_str(),
                candidate.base_description.as_str(),
                candidate.base_unit.as_str(),
                &candidate.unit_price.to_string(),
                &candidate.score.to_string(),
                &candidate.unit_compatible.to_string(),
            ])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source: source.into(),
    })
}

fn read_table(path: &Path) -> Result<(Vec<String>, Vec<csv::StringRecord>), IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .map(normalize_header)
        .collect();
    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    Ok((headers, records))
}

/// Normalized header: normalized text with spaces folded to
/// underscores, so `Precio Unitario` becomes `precio_unitario`.
fn normalize_header(header: &str) -> String {
    normalize_text(header).replace(' ', "_")
}

fn require_columns(
    path: &Path,
    headers: &[String],
    required: &[&str],
) -> Result<HashMap<String, usize>, IoError> {
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), idx))
        .collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !columns.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IoError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }
    Ok(columns)
}

fn cell(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").trim().to_string()
}

/// Lenient numeric parse: empty or non-numeric cells become `None`.
fn parse_float(value: &str) -> Option<f32> {
    if value.is_empty() {
        return None;
    }
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}
