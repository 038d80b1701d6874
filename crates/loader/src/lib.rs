//! Text loaders for the movie catalog and user rating tables.
//!
//! Catalog lines look like `Heat-1995 7 3 9 4`; the users file starts with a
//! header row of titles followed by one row of ratings per user, with `NA`
//! marking an unrated title.

pub mod error;
pub mod movies;
pub mod users;

pub use error::{LoadError, LoadMode, SkippedRecord};
pub use movies::{load_catalog, parse_catalog, CatalogLoad};
pub use users::{load_users, parse_users, UsersLoad};

use std::io::BufRead;

/// Line reader that decodes each line on its own, so one badly encoded line
/// is a record-level failure instead of a failed read.
pub(crate) struct RecordLines<R> {
    reader: R,
    buffer: Vec<u8>,
    line: usize,
}

impl<R: BufRead> RecordLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, buffer: Vec::new(), line: 0 }
    }
}

impl<R: BufRead> Iterator for RecordLines<R> {
    /// The 1-based line number and the decoded text. The outer `Err` is an
    /// I/O failure; the inner one a line that is not valid UTF-8.
    type Item = Result<(usize, Result<String, LoadError>), LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line += 1;
                if self.buffer.ends_with(b"\n") {
                    self.buffer.pop();
                    if self.buffer.ends_with(b"\r") {
                        self.buffer.pop();
                    }
                }
                let line = self.line;
                let bytes = std::mem::take(&mut self.buffer);
                let decoded = String::from_utf8(bytes).map_err(|error| LoadError::MalformedRecord {
                    line,
                    reason: format!("line is not valid UTF-8: {}", error.utf8_error()),
                });
                Some(Ok((line, decoded)))
            }
            Err(error) => Some(Err(LoadError::Read(error))),
        }
    }
}

/// Splits a `Name-Year` token at its last dash.
pub(crate) fn parse_title(token: &str) -> Result<(String, i32), String> {
    let (name, year) =
        token.rsplit_once('-').ok_or_else(|| format!("title `{token}` is not `Name-Year`"))?;
    if name.is_empty() {
        return Err(format!("title `{token}` has an empty name"));
    }
    let year =
        year.parse::<i32>().map_err(|_| format!("title `{token}` has a non-numeric year"))?;
    Ok((name.to_owned(), year))
}
