//! Recommendation engine
//!
//! Content-based ranking projects a user's mean-centred ratings onto item
//! feature vectors and picks the unseen item most similar to the result.
//! Collaborative filtering predicts a rating for each unseen item from the
//! user's ratings of its `k` most similar rated items and picks the highest.

pub mod catalog;
pub mod preference;
pub mod ranking;
pub mod similarity;

pub use catalog::Catalog;
pub use preference::build_preference;
pub use ranking::{PredictionPolicy, Recommendation, RecommendationEngine, DEFAULT_NEIGHBORS};
pub use similarity::{cosine_similarity, CosineSimilarity, SimilarityMetric, EPSILON};
