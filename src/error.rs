//! Crate-level error type.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::ion::ContainerError;

/// Everything that can go wrong between a [`crate::ast::Program`] and bytes.
#[derive(Debug, Error)]
pub enum Error {
    /// The Ion container could not be written or parsed.
    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    /// The wire tree does not describe a valid program.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl Error {
    /// Whether the failure happened below the protocol, in the Ion layer.
    pub fn is_container(&self) -> bool {
        matches!(self, Error::Container(_))
    }
}

/// Result alias used across the crate surface.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let err: Error = ContainerError::NoValue.into();
        assert!(err.is_container());
        assert_eq!(err.to_string(), "container error: stream contains no value");

        let err: Error = DecodeError::DepthLimit { limit: 3 }.into();
        assert!(!err.is_container());
        assert_eq!(
            err.to_string(),
            "decode error: nesting exceeds the depth limit of 3"
        );
    }
}
