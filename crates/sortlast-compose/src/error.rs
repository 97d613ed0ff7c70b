//! Error types for the composition collectives.

use sortlast_comm::CommError;
use thiserror::Error;

/// Result type alias using [`ComposeError`] as the error type.
pub type ComposeResult<T> = std::result::Result<T, ComposeError>;

/// Errors raised by `compose` and `gather`.
///
/// None of these are retried. A collective error on one rank generally
/// implies the whole job is lost; the run loop reports it and exits
/// nonzero.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A local image operation failed (bad region, mismatched
    /// dimensions, short payload).
    #[error(transparent)]
    Image(#[from] sortlast_core::Error),

    /// Transport error, payload size mismatch, or missing peer during a
    /// collective.
    #[error("collective failure: {reason}")]
    CollectiveFailure {
        /// What went wrong, including the peer where known.
        reason: String,
    },

    /// The gather precondition was violated: the callers' regions do not
    /// partition the framebuffer.
    #[error("gather regions do not partition the framebuffer: {reason}")]
    NonPartitioningRegions {
        /// The gap or overlap detected.
        reason: String,
    },

    /// The group size is not a power of two and no fallback was allowed.
    #[error("group size {size} is not a power of two")]
    UnsupportedGroupSize {
        /// The offending group size.
        size: usize,
    },
}

impl ComposeError {
    /// Creates a [`ComposeError::CollectiveFailure`].
    #[inline]
    pub fn collective(reason: impl Into<String>) -> Self {
        Self::CollectiveFailure {
            reason: reason.into(),
        }
    }

    /// Creates a [`ComposeError::NonPartitioningRegions`].
    #[inline]
    pub fn non_partitioning(reason: impl Into<String>) -> Self {
        Self::NonPartitioningRegions {
            reason: reason.into(),
        }
    }
}

impl From<CommError> for ComposeError {
    fn from(err: CommError) -> Self {
        Self::CollectiveFailure {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comm_error_becomes_collective_failure() {
        let err: ComposeError = CommError::Disconnected { peer: 3 }.into();
        assert!(matches!(err, ComposeError::CollectiveFailure { .. }));
        assert!(err.to_string().contains("peer 3"));
    }

    #[test]
    fn test_unsupported_group_size_message() {
        let err = ComposeError::UnsupportedGroupSize { size: 6 };
        assert_eq!(err.to_string(), "group size 6 is not a power of two");
    }
}
