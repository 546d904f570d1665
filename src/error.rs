use thiserror::Error;

/// Failure of an individual query against a loaded model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("user index {0} out of bounds for retrieval model")]
    UserIndexOutOfBounds(usize),
    #[error("factor dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("model query failed: {0}")]
    QueryFailed(String),
}

/// Request-level failure of the recommendation engine.
///
/// Unknown users and missing metadata are handled branches, not errors; the
/// only way a request fails is a model query failing, which must surface
/// rather than be masked as an empty result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("retrieval model query failed")]
    Retrieval(#[source] ModelError),
    #[error("ranking model query failed")]
    Ranking(#[source] ModelError),
}
