/// Convenience result type used across Adforge.
pub type AdforgeResult<T> = Result<T, AdforgeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum AdforgeError {
    /// Invalid user-provided brief, brand, or placement data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Product image does not fit the background after pre-scaling.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Product image carries no usable transparency channel.
    #[error("missing alpha: {0}")]
    MissingAlpha(String),

    /// Aspect transform would upscale beyond the allowed factor.
    #[error("insufficient resolution: {0}")]
    InsufficientResolution(String),

    /// Campaign message cannot fit the layout at the minimum font size.
    #[error("text overflow: {0}")]
    TextOverflow(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdforgeError {
    /// Build an [`AdforgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AdforgeError::SizeMismatch`] value.
    pub fn size_mismatch(msg: impl Into<String>) -> Self {
        Self::SizeMismatch(msg.into())
    }

    /// Build an [`AdforgeError::MissingAlpha`] value.
    pub fn missing_alpha(msg: impl Into<String>) -> Self {
        Self::MissingAlpha(msg.into())
    }

    /// Build an [`AdforgeError::InsufficientResolution`] value.
    pub fn insufficient_resolution(msg: impl Into<String>) -> Self {
        Self::InsufficientResolution(msg.into())
    }

    /// Build an [`AdforgeError::TextOverflow`] value.
    pub fn text_overflow(msg: impl Into<String>) -> Self {
        Self::TextOverflow(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
