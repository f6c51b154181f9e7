use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// the raw name could not be split into at least a base name
    #[error("Malformed benchmark name '{name}': {reason}")]
    MalformedName { name: String, reason: &'static str },
    /// rows of a matrix shaped chart do not share the same number of points
    #[error("Inconsistent number of X-values for {name}: expected {expected}, found {found}")]
    AsymmetricGrouping {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Not enough X-values for {name}: found {found}, at least 2 are required")]
    NotEnoughPoints { name: String, found: usize },
    #[error("Invalid plot parameters: {0}")]
    InvalidPlot(String),
}

impl AnalysisError {
    pub(crate) fn malformed(name: &str, reason: &'static str) -> Self {
        Self::MalformedName {
            name: name.to_owned(),
            reason,
        }
    }
}
