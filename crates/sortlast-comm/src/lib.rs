//! # sortlast-comm
//!
//! Rank groups and tagged point-to-point messaging for sort-last
//! compositing.
//!
//! The compositors in `sortlast-compose` are collectives over a fixed
//! group of P single-threaded ranks. This crate defines the contract they
//! are written against ([`Communicator`]: reliable, FIFO-per-(source,
//! destination, tag) byte transfer plus a symmetric pairwise
//! [`exchange`](Communicator::exchange)) and provides the in-process
//! implementation used by the CLI, the tests, and the benches:
//!
//! - [`ChannelComm`] - endpoints over `std::sync::mpsc` unbounded
//!   channels with MPI-style (source, tag) receive matching
//! - [`group::run`] - one scoped OS thread per rank, results returned in
//!   rank order
//!
//! There is no timeout and no cancellation: a rank that stops
//! participating leaves its peers blocked or erroring, and the collective
//! is abandoned. That matches the failure model of the batch jobs this
//! miniapp emulates.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod communicator;
pub mod error;
pub mod group;

pub use channel::ChannelComm;
pub use communicator::{Communicator, Tag};
pub use error::{CommError, CommResult};
