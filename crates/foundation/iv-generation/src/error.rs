//! Error types for generation flags

/// Errors raised while reading generation settings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Not one of `1995`, `2001`, `2001x`
    #[error("unknown language generation `{0}`")]
    UnknownGeneration(String),

    /// Not a known feature name
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    /// Neither a generation nor a (possibly negated) feature
    #[error("unknown generation flag `{0}`")]
    UnknownFlag(String),
}
