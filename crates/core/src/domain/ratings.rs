use std::collections::BTreeMap;

use crate::domain::item::{Item, ItemRef};

/// A user's ratings keyed by item.
///
/// Iteration follows item order, which makes every pass over a table
/// deterministic, including stable tie-breaks in neighbor selection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatingTable {
    ratings: BTreeMap<ItemRef, f64>,
}

impl RatingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rating, returning the previous one if the item was already rated.
    pub fn insert(&mut self, item: ItemRef, rating: f64) -> Option<f64> {
        self.ratings.insert(item, rating)
    }

    pub fn get(&self, item: &Item) -> Option<f64> {
        self.ratings.get(item).copied()
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.ratings.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemRef, f64)> + '_ {
        self.ratings.iter().map(|(item, rating)| (item, *rating))
    }
}

impl FromIterator<(ItemRef, f64)> for RatingTable {
    fn from_iter<T: IntoIterator<Item = (ItemRef, f64)>>(iter: T) -> Self {
        Self { ratings: iter.into_iter().collect() }
    }
}
