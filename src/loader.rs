//! Bulk loading of tables from CSV files.
//!
//! A manifest lists one table per line as `table_name, path/to/file.csv`.
//! Blank lines and lines starting with `#` are skipped. Relative CSV paths
//! are resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use crate::{Database, DatabaseError, Record, Table};

/// Loads every table named in the manifest into `db`.
///
/// Returns the names of the loaded tables, in manifest order.
pub fn load_manifest<P: AsRef<Path>>(
    db: &mut Database,
    manifest: P,
) -> Result<Vec<String>, DatabaseError> {
    let manifest = manifest.as_ref();
    let contents = std::fs::read_to_string(manifest).map_err(|source| DatabaseError::Io {
        path: manifest.to_path_buf(),
        source,
    })?;

    let base = manifest.parent().unwrap_or_else(|| Path::new(""));

    let mut loaded = Vec::new();
    for (name, csv_path) in parse_manifest(&contents, base)? {
        let table = load_csv_table(&name, &csv_path)?;
        db.create_table(&name, table);
        loaded.push(name);
    }

    Ok(loaded)
}

fn parse_manifest(contents: &str, base: &Path) -> Result<Vec<(String, PathBuf)>, DatabaseError> {
    let mut entries = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, path)) = line.split_once(',') else {
            return Err(DatabaseError::Manifest {
                line: idx + 1,
                reason: "expected `table_name, csv_path`".to_string(),
            });
        };

        let (name, path) = (name.trim(), path.trim());
        if name.is_empty() || path.is_empty() {
            return Err(DatabaseError::Manifest {
                line: idx + 1,
                reason: "table name and path must not be empty".to_string(),
            });
        }

        entries.push((name.to_string(), base.join(path)));
    }

    Ok(entries)
}

/// Reads a CSV file with a header row into a table.
///
/// Records shorter than the header leave the trailing columns unset; extra
/// fields are dropped.
pub fn load_csv_table<P: AsRef<Path>>(name: &str, path: P) -> Result<Table, DatabaseError> {
    let path = path.as_ref();
    let csv_error = |source: csv::Error| DatabaseError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.is_empty() {
        tracing::warn!(path = %path.display(), "CSV file is empty");
        return Ok(Table::new::<&str>(name, &[]));
    }

    let mut table = Table::new(name, columns.as_slice());

    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Record = table
            .columns
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        table.rows.push(row);
    }

    tracing::debug!(table = name, rows = table.len(), path = %path.display(), "loaded CSV");
    Ok(table)
}
