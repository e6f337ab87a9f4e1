/// Convenience result type used across insignia.
pub type InsigniaResult<T> = Result<T, InsigniaError>;

/// Top-level error taxonomy used by engine APIs.
///
/// "Nothing to show" is not an error: selection and composition report it through
/// [`crate::RenderOutcome::NothingToShow`]. Only malformed input and host failures land here.
#[derive(thiserror::Error, Debug)]
pub enum InsigniaError {
    /// Invalid catalog, user context or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// The drawing surface could not be created or written.
    #[error("surface error: {0}")]
    Surface(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InsigniaError {
    /// Build a [`InsigniaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`InsigniaError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`InsigniaError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`InsigniaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
