use std::fmt;

use thiserror::Error;

/// Why a feature vector was rejected by the catalog.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureVectorIssue {
    Empty,
    OutOfRange { index: usize, value: f64 },
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for FeatureVectorIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "feature vector is empty"),
            Self::OutOfRange { index, value } => {
                write!(f, "feature #{index} = {value} is outside the range [1, 10]")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "feature vector has {actual} dimensions, catalog expects {expected}")
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("invalid feature vector: {0}")]
    InvalidFeatureVector(FeatureVectorIssue),
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("no rated item is present in the catalog")]
    NoRatableItems,
    #[error("rating table is empty")]
    NoRatings,
    #[error("item not found in catalog: {name} ({year})")]
    ItemNotFound { name: String, year: i32 },
    #[error("neighbor similarities sum to zero; no reliable prediction")]
    DegenerateNeighborhood,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DomainError {
    /// Errors that mean "this rating set carries no usable signal" rather
    /// than a caller bug. Ranking skips candidates that fail this way.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoRatableItems
                | Self::NoRatings
                | Self::ItemNotFound { .. }
                | Self::DegenerateNeighborhood
        )
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("load failure: {0}")]
    Load(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::ItemNotFound { .. }) => "item_not_found",
            Self::Domain(DomainError::InvalidArgument(_)) => "invalid_argument",
            Self::Domain(error) if error.is_recoverable() => "no_signal",
            Self::Domain(_) => "engine",
            Self::Load(_) => "load",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Load(_) => 3,
            Self::Domain(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(error) if error.is_recoverable() => {
                "Not enough rating signal to score this request."
            }
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Load(_) => "The data files could not be loaded.",
            Self::Configuration(_) => "The configuration is invalid.",
        }
    }
}
