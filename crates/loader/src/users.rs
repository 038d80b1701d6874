use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use cinerank_core::{Catalog, ItemRef, RatingTable, UserProfile};
use tracing::info;

use crate::error::{LoadError, LoadMode, SkippedRecord};
use crate::{parse_title, RecordLines};

const UNRATED: &str = "NA";

#[derive(Debug)]
pub struct UsersLoad {
    pub users: Vec<UserProfile>,
    pub skipped: Vec<SkippedRecord>,
}

pub fn load_users(path: &Path, catalog: &Catalog, mode: LoadMode) -> Result<UsersLoad, LoadError> {
    let file = File::open(path)
        .map_err(|source| LoadError::Open { path: path.to_path_buf(), source })?;
    let load = parse_users(BufReader::new(file), catalog, mode)?;
    info!(
        event_name = "loader.users.loaded",
        path = %path.display(),
        users = load.users.len(),
        skipped = load.skipped.len(),
        "user ratings loaded"
    );
    Ok(load)
}

/// Parses a header of catalog titles followed by one rating row per user.
///
/// A header title that cannot be resolved keeps its column so later ratings
/// stay aligned; values in that column are dropped. Rows that end up with no
/// rating are not returned.
pub fn parse_users<R: BufRead>(
    reader: R,
    catalog: &Catalog,
    mode: LoadMode,
) -> Result<UsersLoad, LoadError> {
    let mut skipped = Vec::new();
    let mut users = Vec::new();
    let mut lines = RecordLines::new(reader);

    // An undecodable line where the header should be is skipped like any other
    // bad record; the next non-blank line is taken as the header.
    let columns = loop {
        let Some(record) = lines.next() else {
            return Ok(UsersLoad { users, skipped });
        };
        let (line_number, line) = record?;
        match line {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => break parse_header(&line, line_number, catalog, mode, &mut skipped)?,
            Err(error) => mode.absorb(error, &mut skipped, "users")?,
        }
    };

    for record in lines {
        let (line_number, line) = record?;
        let parsed = line.and_then(|line| {
            if line.trim().is_empty() {
                return Ok(None);
            }
            parse_row(&line, line_number, &columns).map(Some)
        });

        match parsed {
            Ok(Some(user)) if !user.ratings().is_empty() => users.push(user),
            Ok(_) => {}
            Err(error) => mode.absorb(error, &mut skipped, "users")?,
        }
    }

    Ok(UsersLoad { users, skipped })
}

fn parse_header(
    line: &str,
    line_number: usize,
    catalog: &Catalog,
    mode: LoadMode,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Vec<Option<ItemRef>>, LoadError> {
    let mut columns = Vec::new();
    for token in line.split_whitespace().skip(1) {
        let column = match parse_title(token) {
            Ok((name, year)) => catalog.get(&name, year).ok_or_else(|| LoadError::UnknownTitle {
                line: line_number,
                title: token.to_owned(),
            }),
            Err(reason) => Err(LoadError::MalformedRecord { line: line_number, reason }),
        };
        match column {
            Ok(item) => columns.push(Some(item)),
            Err(error) => {
                mode.absorb(error, skipped, "users")?;
                columns.push(None);
            }
        }
    }
    Ok(columns)
}

fn parse_row(
    line: &str,
    line_number: usize,
    columns: &[Option<ItemRef>],
) -> Result<UserProfile, LoadError> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().unwrap_or_default();
    let mut ratings = RatingTable::new();

    for (column, token) in columns.iter().zip(tokens) {
        if token == UNRATED {
            continue;
        }
        let rating = token.parse::<f64>().ok().filter(|value| value.is_finite()).ok_or_else(
            || LoadError::MalformedRecord {
                line: line_number,
                reason: format!("rating `{token}` for user `{name}` is not a number"),
            },
        )?;
        if let Some(item) = column {
            ratings.insert(ItemRef::clone(item), rating);
        }
    }

    Ok(UserProfile::new(name, ratings))
}
