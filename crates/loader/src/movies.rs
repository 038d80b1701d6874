use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use cinerank_core::Catalog;
use tracing::info;

use crate::error::{LoadError, LoadMode, SkippedRecord};
use crate::{parse_title, RecordLines};

#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedRecord>,
}

pub fn load_catalog(path: &Path, mode: LoadMode) -> Result<CatalogLoad, LoadError> {
    let file = File::open(path)
        .map_err(|source| LoadError::Open { path: path.to_path_buf(), source })?;
    let load = parse_catalog(BufReader::new(file), mode)?;
    info!(
        event_name = "loader.catalog.loaded",
        path = %path.display(),
        items = load.catalog.len(),
        skipped = load.skipped.len(),
        "movie catalog loaded"
    );
    Ok(load)
}

/// Parses `Name-Year f1 f2 ...` records. Blank lines are ignored.
pub fn parse_catalog<R: BufRead>(reader: R, mode: LoadMode) -> Result<CatalogLoad, LoadError> {
    let mut catalog = Catalog::new();
    let mut skipped = Vec::new();

    for record in RecordLines::new(reader) {
        let (line_number, line) = record?;
        let parsed = line.and_then(|line| {
            if line.trim().is_empty() {
                return Ok(());
            }
            parse_record(&mut catalog, &line, line_number)
        });
        if let Err(error) = parsed {
            mode.absorb(error, &mut skipped, "movies")?;
        }
    }

    Ok(CatalogLoad { catalog, skipped })
}

fn parse_record(catalog: &mut Catalog, line: &str, line_number: usize) -> Result<(), LoadError> {
    let mut tokens = line.split_whitespace();
    let title = tokens.next().unwrap_or_default();
    let (name, year) = parse_title(title)
        .map_err(|reason| LoadError::MalformedRecord { line: line_number, reason })?;

    let features = tokens
        .map(|token| {
            token.parse::<f64>().ok().filter(|value| value.is_finite()).ok_or_else(|| {
                LoadError::MalformedRecord {
                    line: line_number,
                    reason: format!("feature `{token}` is not a number"),
                }
            })
        })
        .collect::<Result<Vec<f64>, LoadError>>()?;

    catalog
        .upsert(name, year, features)
        .map_err(|source| LoadError::InvalidRecord { line: line_number, source })?;
    Ok(())
}
