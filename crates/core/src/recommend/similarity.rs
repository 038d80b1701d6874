use crate::errors::DomainError;

/// Norms and weight sums below this are treated as zero.
pub const EPSILON: f64 = 1e-10;

/// Bounded similarity between two equal-length vectors.
pub trait SimilarityMetric: Send + Sync {
    /// Returns a score in `[-1, 1]`, or `DimensionMismatch` when the
    /// lengths differ.
    fn similarity(&self, left: &[f64], right: &[f64]) -> Result<f64, DomainError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CosineSimilarity;

impl SimilarityMetric for CosineSimilarity {
    fn similarity(&self, left: &[f64], right: &[f64]) -> Result<f64, DomainError> {
        cosine_similarity(left, right)
    }
}

/// Cosine similarity. A zero-norm operand yields `0.0`.
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> Result<f64, DomainError> {
    if left.len() != right.len() {
        return Err(DomainError::DimensionMismatch { left: left.len(), right: right.len() });
    }

    let (dot, left_sq, right_sq) =
        left.iter().zip(right).fold((0.0, 0.0, 0.0), |(dot, l, r), (a, b)| {
            (dot + a * b, l + a * a, r + b * b)
        });

    let left_norm = left_sq.sqrt();
    let right_norm = right_sq.sqrt();
    if left_norm < EPSILON || right_norm < EPSILON {
        return Ok(0.0);
    }

    let score = dot / (left_norm * right_norm);
    if !score.is_finite() {
        return Ok(0.0);
    }
    Ok(score.clamp(-1.0, 1.0))
}

pub fn euclidean_norm(vector: &[f64]) -> f64 {
    vector.iter().map(|value| value * value).sum::<f64>().sqrt()
}
