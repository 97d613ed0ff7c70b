//! Error types for the communication layer.

use thiserror::Error;

/// Result type alias using [`CommError`] as the error type.
pub type CommResult<T> = std::result::Result<T, CommError>;

/// Errors raised by the transport.
///
/// The composition layer folds all of these into its collective-failure
/// kind; the distinction only matters for diagnostics.
#[derive(Debug, Error)]
pub enum CommError {
    /// A peer rank does not exist in the group.
    #[error("rank {rank} out of range for group of {size}")]
    InvalidRank {
        /// The offending rank.
        rank: usize,
        /// Group size.
        size: usize,
    },

    /// A rank addressed itself.
    #[error("rank {rank} cannot message itself")]
    SelfMessage {
        /// The rank that tried.
        rank: usize,
    },

    /// The peer's endpoint is gone; the collective cannot complete.
    #[error("peer {peer} disconnected")]
    Disconnected {
        /// The vanished peer.
        peer: usize,
    },
}
