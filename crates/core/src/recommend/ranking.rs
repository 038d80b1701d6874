use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::item::{Item, ItemRef};
use crate::domain::ratings::RatingTable;
use crate::errors::DomainError;
use crate::recommend::catalog::Catalog;
use crate::recommend::preference::{build_preference, catalogued_mean};
use crate::recommend::similarity::{CosineSimilarity, SimilarityMetric, EPSILON};

/// How neighbor ratings are combined into a predicted score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionPolicy {
    /// `Σ(sim·rating) / Σ sim` over the selected neighbors.
    #[default]
    Raw,
    /// `mean + Σ(sim·(rating − mean)) / Σ sim`, with `mean` taken over all of
    /// the user's catalogued ratings.
    MeanCentered,
}

impl PredictionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::MeanCentered => "mean_centered",
        }
    }
}

/// The winning candidate of a ranking pass and the score it won with.
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub item: ItemRef,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Neighbor {
    similarity: f64,
    rating: f64,
}

pub const DEFAULT_NEIGHBORS: usize = 3;

#[derive(Clone, Debug)]
pub struct RecommendationEngine<S = CosineSimilarity> {
    metric: S,
    policy: PredictionPolicy,
    default_neighbors: usize,
}

impl RecommendationEngine<CosineSimilarity> {
    pub fn new() -> Self {
        Self::with_metric(CosineSimilarity)
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new()
            .with_policy(config.prediction_policy)
            .with_default_neighbors(config.neighbors)
    }
}

impl Default for RecommendationEngine<CosineSimilarity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SimilarityMetric> RecommendationEngine<S> {
    pub fn with_metric(metric: S) -> Self {
        Self { metric, policy: PredictionPolicy::default(), default_neighbors: DEFAULT_NEIGHBORS }
    }

    pub fn with_policy(mut self, policy: PredictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_neighbors(mut self, neighbors: usize) -> Self {
        self.default_neighbors = neighbors;
        self
    }

    pub fn policy(&self) -> PredictionPolicy {
        self.policy
    }

    /// Neighbor count used when a caller does not pass an explicit `k`.
    pub fn default_neighbors(&self) -> usize {
        self.default_neighbors
    }

    /// Best unseen item by similarity to the user's preference vector.
    ///
    /// Returns `Ok(None)` when the ratings carry no signal or every
    /// catalogued item has already been rated.
    pub fn recommend_by_content(
        &self,
        ratings: &RatingTable,
        catalog: &Catalog,
    ) -> Result<Option<Recommendation>, DomainError> {
        let preference = match build_preference(ratings, catalog) {
            Ok(preference) => preference,
            Err(error) if error.is_recoverable() => {
                debug!(
                    event_name = "engine.recommend.content.no_signal",
                    reason = %error,
                    rated_count = ratings.len(),
                    "no preference vector for rating table"
                );
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        let mut best: Option<Recommendation> = None;
        for (item, features) in catalog.iter() {
            if ratings.contains(item) {
                continue;
            }
            let score = self.metric.similarity(&preference, features)?;
            consider(&mut best, item, score);
        }

        let recommended = best.as_ref().map(|winner| winner.item.to_string());
        debug!(
            event_name = "engine.recommend.content.completed",
            recommended = recommended.as_deref(),
            score = best.as_ref().map(|winner| winner.score),
            "content-based ranking completed"
        );
        Ok(best)
    }

    /// Best unseen item by predicted score from its `k` nearest rated items.
    ///
    /// Candidates whose prediction has no usable signal are skipped.
    pub fn recommend_by_cf(
        &self,
        ratings: &RatingTable,
        k: usize,
        catalog: &Catalog,
    ) -> Result<Option<Recommendation>, DomainError> {
        validate_neighbors(k)?;
        if ratings.is_empty() {
            return Ok(None);
        }

        let mut best: Option<Recommendation> = None;
        let mut skipped = 0usize;
        for item in catalog.items() {
            if ratings.contains(item) {
                continue;
            }
            match self.predict_score(ratings, item, k, catalog) {
                Ok(score) => consider(&mut best, item, score),
                Err(error) if error.is_recoverable() => skipped += 1,
                Err(error) => return Err(error),
            }
        }

        let recommended = best.as_ref().map(|winner| winner.item.to_string());
        debug!(
            event_name = "engine.recommend.cf.completed",
            recommended = recommended.as_deref(),
            score = best.as_ref().map(|winner| winner.score),
            skipped_candidates = skipped,
            neighbors = k,
            "collaborative filtering ranking completed"
        );
        Ok(best)
    }

    /// Predicts the user's rating for `target` from the `k` most similar
    /// rated items. Ties in similarity keep rating-table order.
    pub fn predict_score(
        &self,
        ratings: &RatingTable,
        target: &Item,
        k: usize,
        catalog: &Catalog,
    ) -> Result<f64, DomainError> {
        validate_neighbors(k)?;
        let target_features = catalog.features(target).ok_or_else(|| {
            DomainError::ItemNotFound { name: target.name().to_owned(), year: target.year() }
        })?;
        if ratings.is_empty() {
            return Err(DomainError::NoRatings);
        }

        let mut neighbors = Vec::with_capacity(ratings.len());
        for (item, rating) in ratings.iter() {
            let Some(features) = catalog.features(item) else {
                continue;
            };
            let similarity = self.metric.similarity(target_features, features)?;
            neighbors.push(Neighbor { similarity, rating });
        }
        let mean = catalogued_mean(ratings, catalog).ok_or(DomainError::NoRatableItems)?;
        neighbors.sort_by(|left, right| right.similarity.total_cmp(&left.similarity));
        neighbors.truncate(k);

        aggregate(&neighbors, self.policy, mean)
    }

    /// Like [`predict_score`](Self::predict_score), resolving the target by title.
    pub fn predict_score_by_title(
        &self,
        ratings: &RatingTable,
        name: &str,
        year: i32,
        k: usize,
        catalog: &Catalog,
    ) -> Result<f64, DomainError> {
        validate_neighbors(k)?;
        let target = catalog
            .get(name, year)
            .ok_or_else(|| DomainError::ItemNotFound { name: name.to_owned(), year })?;
        self.predict_score(ratings, &target, k, catalog)
    }
}

fn validate_neighbors(k: usize) -> Result<(), DomainError> {
    if k == 0 {
        return Err(DomainError::InvalidArgument("k must be greater than zero".to_owned()));
    }
    Ok(())
}

fn aggregate(
    neighbors: &[Neighbor],
    policy: PredictionPolicy,
    mean: f64,
) -> Result<f64, DomainError> {
    let weight_sum: f64 = neighbors.iter().map(|neighbor| neighbor.similarity).sum();
    if weight_sum < EPSILON {
        return Err(DomainError::DegenerateNeighborhood);
    }

    match policy {
        PredictionPolicy::Raw => {
            let weighted: f64 =
                neighbors.iter().map(|neighbor| neighbor.similarity * neighbor.rating).sum();
            Ok(weighted / weight_sum)
        }
        PredictionPolicy::MeanCentered => {
            let weighted: f64 = neighbors
                .iter()
                .map(|neighbor| neighbor.similarity * (neighbor.rating - mean))
                .sum();
            Ok(mean + weighted / weight_sum)
        }
    }
}

/// Candidates arrive in item order; a later candidate must beat the
/// incumbent by more than `EPSILON` to replace it.
fn consider(best: &mut Option<Recommendation>, item: &ItemRef, score: f64) {
    let improves = best.as_ref().map_or(true, |incumbent| score > incumbent.score + EPSILON);
    if improves {
        *best = Some(Recommendation { item: ItemRef::clone(item), score });
    }
}
