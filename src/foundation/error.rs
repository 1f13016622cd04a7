/// Convenience result type used across gifcomp.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Top-level error taxonomy used by composer, surface and source APIs.
///
/// Every failure in the composition core is local and recoverable: callers get one of these
/// values back and decide whether to retry on the next animation tick.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    /// Invalid user-provided data or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// The frame source could not produce a frame.
    #[error("decode error: {0}")]
    Decode(String),

    /// A surface or bitmap could not be allocated.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// A draw batch failed to end; the host should recreate its device resources.
    #[error("device lost: {0}")]
    DeviceLost(String),

    /// Nothing has been composed yet, or the composer has no surface.
    #[error("not ready: {0}")]
    NotReady(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComposeError {
    /// Build a [`ComposeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ComposeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ComposeError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`ComposeError::DeviceLost`] value.
    pub fn device_lost(msg: impl Into<String>) -> Self {
        Self::DeviceLost(msg.into())
    }

    /// Build a [`ComposeError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Return `true` when the host should discard and recreate its surfaces.
    pub fn is_device_lost(&self) -> bool {
        matches!(self, Self::DeviceLost(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
