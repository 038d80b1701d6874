use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared handle to a catalog entry. The catalog owns the canonical handle;
/// rating tables hold clones of it.
pub type ItemRef = Arc<Item>;

/// A catalog entry identified by `(name, year)`.
///
/// Equality and hashing are structural. Ordering is by year, then by name,
/// which is the order catalogs enumerate in and the order ties resolve in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    name: String,
    year: i32,
}

impl Item {
    pub fn new(name: impl Into<String>, year: i32) -> Self {
        Self { name: name.into(), year }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year.cmp(&other.year).then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.year)
    }
}
