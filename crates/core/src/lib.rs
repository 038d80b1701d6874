pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use domain::item::{Item, ItemRef};
pub use domain::ratings::RatingTable;
pub use domain::user::UserProfile;
pub use errors::{ApplicationError, DomainError, FeatureVectorIssue};
pub use recommend::{
    build_preference, cosine_similarity, Catalog, CosineSimilarity, PredictionPolicy,
    Recommendation, RecommendationEngine, SimilarityMetric,
};
