use crate::domain::ratings::RatingTable;
use crate::errors::DomainError;
use crate::recommend::catalog::Catalog;
use crate::recommend::similarity::{euclidean_norm, EPSILON};

/// Builds a unit-length taste vector from a user's ratings.
///
/// Ratings are mean-centred over the catalogued items before weighting, so
/// items the user liked more than their own average pull the vector toward
/// their features and the rest push it away. Ratings for items missing from
/// the catalog are ignored. If every rating equals the mean the result is the
/// zero vector.
pub fn build_preference(ratings: &RatingTable, catalog: &Catalog) -> Result<Vec<f64>, DomainError> {
    let rated: Vec<(&[f64], f64)> = ratings
        .iter()
        .filter_map(|(item, rating)| catalog.features(item).map(|features| (features, rating)))
        .collect();

    let dimension = match (rated.is_empty(), catalog.dimension()) {
        (false, Some(dimension)) => dimension,
        _ => return Err(DomainError::NoRatableItems),
    };

    let mean = user_mean(&rated);
    let mut preference = vec![0.0; dimension];
    for (features, rating) in &rated {
        let weight = rating - mean;
        for (slot, feature) in preference.iter_mut().zip(features.iter()) {
            *slot += weight * feature;
        }
    }

    let norm = euclidean_norm(&preference);
    if norm > EPSILON {
        preference.iter_mut().for_each(|value| *value /= norm);
    }

    Ok(preference)
}

/// Mean of the ratings whose items are present in `catalog`.
pub fn catalogued_mean(ratings: &RatingTable, catalog: &Catalog) -> Option<f64> {
    let rated: Vec<f64> = ratings
        .iter()
        .filter(|(item, _)| catalog.contains(item))
        .map(|(_, rating)| rating)
        .collect();
    if rated.is_empty() {
        return None;
    }
    Some(rated.iter().sum::<f64>() / rated.len() as f64)
}

fn user_mean(rated: &[(&[f64], f64)]) -> f64 {
    rated.iter().map(|(_, rating)| rating).sum::<f64>() / rated.len() as f64
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::item::Item;
    use crate::domain::ratings::RatingTable;
    use crate::errors::DomainError;
    use crate::recommend::catalog::Catalog;
    use crate::recommend::similarity::euclidean_norm;

    use super::{build_preference, catalogued_mean};

    const TOLERANCE: f64 = 1e-9;

    fn catalog_fixture() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.upsert("A", 2000, vec![1.0, 1.0]).expect("valid");
        catalog.upsert("B", 2010, vec![10.0, 10.0]).expect("valid");
        catalog.upsert("C", 2020, vec![5.0, 5.0]).expect("valid");
        catalog
    }

    fn ratings(entries: &[(&str, i32, f64)]) -> RatingTable {
        entries
            .iter()
            .map(|(name, year, rating)| (Arc::new(Item::new(*name, *year)), *rating))
            .collect()
    }

    #[test]
    fn points_toward_items_rated_above_mean() {
        let catalog = catalog_fixture();
        let preference =
            build_preference(&ratings(&[("A", 2000, 1.0), ("B", 2010, 10.0)]), &catalog)
                .expect("ratable items");

        // mean 5.5: -4.5 * [1, 1] + 4.5 * [10, 10] = [40.5, 40.5], normalised.
        let expected = 1.0 / 2f64.sqrt();
        assert!((preference[0] - expected).abs() < TOLERANCE);
        assert!((preference[1] - expected).abs() < TOLERANCE);
        assert!((euclidean_norm(&preference) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn uniform_ratings_give_zero_vector() {
        let catalog = catalog_fixture();
        let preference =
            build_preference(&ratings(&[("A", 2000, 7.0), ("B", 2010, 7.0)]), &catalog)
                .expect("ratable items");

        assert_eq!(preference, vec![0.0, 0.0]);
    }

    #[test]
    fn unknown_items_are_ignored_for_mean_and_sum() {
        let catalog = catalog_fixture();
        let with_unknown = ratings(&[("A", 2000, 1.0), ("B", 2010, 10.0), ("Ghost", 1999, 100.0)]);
        let without_unknown = ratings(&[("A", 2000, 1.0), ("B", 2010, 10.0)]);

        assert_eq!(
            build_preference(&with_unknown, &catalog),
            build_preference(&without_unknown, &catalog)
        );
        assert_eq!(catalogued_mean(&with_unknown, &catalog), Some(5.5));
    }

    #[test]
    fn no_ratable_items_is_an_error() {
        let catalog = catalog_fixture();

        assert_eq!(
            build_preference(&RatingTable::new(), &catalog),
            Err(DomainError::NoRatableItems)
        );
        assert_eq!(
            build_preference(&ratings(&[("Ghost", 1999, 8.0)]), &catalog),
            Err(DomainError::NoRatableItems)
        );
        assert_eq!(catalogued_mean(&RatingTable::new(), &catalog), None);
    }

    #[test]
    fn empty_catalog_has_nothing_to_rate() {
        assert_eq!(
            build_preference(&ratings(&[("A", 2000, 8.0)]), &Catalog::new()),
            Err(DomainError::NoRatableItems)
        );
    }
}
