use thiserror::Error;

/// Errors reported by the canvas and by resource constructors.
///
/// Validation happens at the call that introduces bad data (shader, effect or
/// geometry construction). Tessellation itself never fails: degenerate input
/// produces an empty primitive instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed construction input (dash pattern, gradient stops, radii, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `restore` was called with no matching `save`.
    #[error("restore called without a matching save")]
    StackUnderflow,

    /// A draw call referenced a resource after `release` was called on it.
    #[error("{0} used after release")]
    UseAfterRelease(&'static str),

    /// The device backend failed to create a surface or consume a batch.
    #[error("device error")]
    Device(#[source] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
