//! Thread-per-rank execution of a fixed group.
//!
//! The original model is one single-threaded OS process per rank; the
//! in-process rendition spawns one scoped OS thread per rank instead and
//! hands each its [`ChannelComm`] endpoint. Nothing is shared between the
//! closures beyond the channels inside the endpoints, so the
//! no-shared-mutable-state discipline of the message-passing model is
//! preserved.

use std::panic;
use std::thread;

use crate::channel::ChannelComm;

/// Runs `f` once per rank on its own thread and returns the per-rank
/// results in rank order.
///
/// A panic on any rank thread is resumed on the caller once all threads
/// have been joined.
///
/// # Panics
///
/// Panics if `size` is zero, or to propagate a rank panic.
///
/// # Example
///
/// ```rust
/// use sortlast_comm::{group, Communicator};
///
/// let ranks = group::run(3, |comm| comm.rank() * 10);
/// assert_eq!(ranks, vec![0, 10, 20]);
/// ```
pub fn run<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(ChannelComm) -> T + Send + Sync,
{
    let endpoints = ChannelComm::group(size);
    thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|comm| {
                let f = &f;
                scope.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(value) => value,
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communicator::{Communicator, Tag};

    #[test]
    fn test_results_in_rank_order() {
        let results = run(4, |comm| (comm.rank(), comm.size()));
        assert_eq!(results, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn test_ring_pass() {
        // Each rank forwards its rank byte around the ring once.
        let results = run(4, |comm| {
            let next = (comm.rank() + 1) % comm.size();
            let prev = (comm.rank() + comm.size() - 1) % comm.size();
            comm.send(next, Tag::new(1), &[comm.rank() as u8]).unwrap();
            comm.recv(prev, Tag::new(1)).unwrap()[0]
        });
        assert_eq!(results, vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_single_rank_group() {
        let results = run(1, |comm| comm.size());
        assert_eq!(results, vec![1]);
    }
}
