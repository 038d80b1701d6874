use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::item::{Item, ItemRef};
use crate::errors::{DomainError, FeatureVectorIssue};

pub const MIN_FEATURE: f64 = 1.0;
pub const MAX_FEATURE: f64 = 10.0;

/// Item to feature-vector map backing every recommendation.
///
/// The first stored vector fixes the dimension for the lifetime of the
/// catalog. Enumeration follows item order (year, then name).
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: BTreeMap<ItemRef, Vec<f64>>,
    dimension: Option<usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, year: i32) -> Option<ItemRef> {
        let probe = Item::new(name, year);
        self.entries.get_key_value(&probe).map(|(item, _)| Arc::clone(item))
    }

    /// Returns the catalogued item for `(name, year)`, inserting it first if
    /// needed. An existing item keeps its original feature vector.
    pub fn upsert(
        &mut self,
        name: impl Into<String>,
        year: i32,
        features: Vec<f64>,
    ) -> Result<ItemRef, DomainError> {
        self.validate(&features)?;

        let candidate = Item::new(name, year);
        if let Some((existing, _)) = self.entries.get_key_value(&candidate) {
            return Ok(Arc::clone(existing));
        }

        let item = Arc::new(candidate);
        self.dimension.get_or_insert(features.len());
        self.entries.insert(Arc::clone(&item), features);
        debug!(
            event_name = "catalog.item.inserted",
            item = %item,
            catalog_size = self.entries.len(),
            "catalog item inserted"
        );
        Ok(item)
    }

    pub fn features(&self, item: &Item) -> Option<&[f64]> {
        self.entries.get(item).map(Vec::as_slice)
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.entries.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feature dimension, fixed by the first insert.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemRef, &[f64])> + '_ {
        self.entries.iter().map(|(item, features)| (item, features.as_slice()))
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemRef> + '_ {
        self.entries.keys()
    }

    fn validate(&self, features: &[f64]) -> Result<(), DomainError> {
        if features.is_empty() {
            return Err(DomainError::InvalidFeatureVector(FeatureVectorIssue::Empty));
        }

        if let Some((index, value)) = features
            .iter()
            .enumerate()
            .find(|(_, value)| !(MIN_FEATURE..=MAX_FEATURE).contains(*value))
        {
            return Err(DomainError::InvalidFeatureVector(FeatureVectorIssue::OutOfRange {
                index,
                value: *value,
            }));
        }

        match self.dimension {
            Some(expected) if expected != features.len() => {
                Err(DomainError::InvalidFeatureVector(FeatureVectorIssue::DimensionMismatch {
                    expected,
                    actual: features.len(),
                }))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.entries.keys() {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}
