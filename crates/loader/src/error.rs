use std::path::PathBuf;

use cinerank_core::DomainError;
use thiserror::Error;
use tracing::warn;

/// What to do with a record that cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Abort the whole load on the first bad record.
    Strict,
    /// Skip the record, log it and report it in the load result.
    #[default]
    Lenient,
}

impl LoadMode {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Lenient
        }
    }

    /// Fails with `error` in strict mode; otherwise records it as skipped.
    pub(crate) fn absorb(
        self,
        error: LoadError,
        skipped: &mut Vec<SkippedRecord>,
        file_kind: &'static str,
    ) -> Result<(), LoadError> {
        match self {
            Self::Strict => Err(error),
            Self::Lenient => {
                let record = error.into_skipped();
                warn!(
                    event_name = "loader.record.skipped",
                    file_kind,
                    line = record.line,
                    reason = %record.reason,
                    "skipping unloadable record"
                );
                skipped.push(record);
                Ok(())
            }
        }
    }
}

/// A record dropped during a lenient load. `line` is 1-based.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRecord {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open `{path}`: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("read failure: {0}")]
    Read(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("line {line}: {source}")]
    InvalidRecord { line: usize, source: DomainError },
    #[error("line {line}: title `{title}` is not in the catalog")]
    UnknownTitle { line: usize, title: String },
}

impl LoadError {
    /// The skip-list entry a lenient load records instead of failing.
    pub(crate) fn into_skipped(self) -> SkippedRecord {
        match self {
            Self::MalformedRecord { line, reason } => SkippedRecord { line, reason },
            Self::InvalidRecord { line, ref source } => {
                SkippedRecord { line, reason: source.to_string() }
            }
            Self::UnknownTitle { line, ref title } => {
                SkippedRecord { line, reason: format!("title `{title}` is not in the catalog") }
            }
            Self::Open { .. } | Self::Read(_) => {
                SkippedRecord { line: 0, reason: self.to_string() }
            }
        }
    }
}
