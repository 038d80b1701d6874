use crate::domain::item::ItemRef;
use crate::domain::ratings::RatingTable;
use crate::errors::DomainError;
use crate::recommend::catalog::Catalog;

/// A named user and the ratings they have given.
#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    name: String,
    ratings: RatingTable,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, ratings: RatingTable) -> Self {
        Self { name: name.into(), ratings }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ratings(&self) -> &RatingTable {
        &self.ratings
    }

    /// Adds the movie to `catalog` if it is new, then records the rating.
    /// A repeated rating for the same movie replaces the earlier one.
    pub fn rate(
        &mut self,
        catalog: &mut Catalog,
        name: &str,
        year: i32,
        features: Vec<f64>,
        rating: f64,
    ) -> Result<ItemRef, DomainError> {
        let item = catalog.upsert(name, year, features)?;
        self.ratings.insert(ItemRef::clone(&item), rating);
        Ok(item)
    }

    /// Rates a movie that must already be catalogued.
    pub fn rate_existing(
        &mut self,
        catalog: &Catalog,
        name: &str,
        year: i32,
        rating: f64,
    ) -> Result<ItemRef, DomainError> {
        let item = catalog
            .get(name, year)
            .ok_or_else(|| DomainError::ItemNotFound { name: name.to_owned(), year })?;
        self.ratings.insert(ItemRef::clone(&item), rating);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::item::Item;
    use crate::domain::ratings::RatingTable;
    use crate::errors::DomainError;
    use crate::recommend::catalog::Catalog;

    use super::UserProfile;

    #[test]
    fn rate_adds_unknown_movie_to_catalog() {
        let mut catalog = Catalog::new();
        let mut user = UserProfile::new("sofia", RatingTable::new());

        let item = user.rate(&mut catalog, "Heat", 1995, vec![8.0, 2.0], 9.0).expect("valid");

        assert!(catalog.contains(&item));
        assert_eq!(user.ratings().get(&Item::new("Heat", 1995)), Some(9.0));
    }

    #[test]
    fn rating_the_same_movie_again_overwrites() {
        let mut catalog = Catalog::new();
        let mut user = UserProfile::new("sofia", RatingTable::new());

        user.rate(&mut catalog, "Heat", 1995, vec![8.0, 2.0], 9.0).expect("valid");
        user.rate(&mut catalog, "Heat", 1995, vec![1.0, 1.0], 3.0).expect("valid");

        assert_eq!(user.ratings().len(), 1);
        assert_eq!(user.ratings().get(&Item::new("Heat", 1995)), Some(3.0));
        assert_eq!(catalog.features(&Item::new("Heat", 1995)), Some(&[8.0, 2.0][..]));
    }

    #[test]
    fn invalid_features_leave_ratings_untouched() {
        let mut catalog = Catalog::new();
        let mut user = UserProfile::new("sofia", RatingTable::new());

        let result = user.rate(&mut catalog, "Heat", 1995, vec![0.0], 9.0);

        assert!(matches!(result, Err(DomainError::InvalidFeatureVector(_))));
        assert!(user.ratings().is_empty());
    }

    #[test]
    fn rate_existing_requires_catalogued_item() {
        let mut catalog = Catalog::new();
        catalog.upsert("Heat", 1995, vec![8.0, 2.0]).expect("valid");
        let mut user = UserProfile::new("sofia", RatingTable::new());

        assert!(user.rate_existing(&catalog, "Heat", 1995, 6.0).is_ok());
        assert_eq!(
            user.rate_existing(&catalog, "Alien", 1979, 6.0),
            Err(DomainError::ItemNotFound { name: "Alien".to_owned(), year: 1979 })
        );
        assert_eq!(user.name(), "sofia");
    }
}
