//! In-process transport over `std::sync::mpsc` channels.
//!
//! Each rank owns a [`ChannelComm`]: an unbounded inbox plus a sender
//! handle for every other rank's inbox. Sends therefore never block, and
//! a symmetric [`exchange`](Communicator::exchange) cannot deadlock. The
//! inbox is a single queue fed by all peers, so a receive that asks for a
//! specific (source, tag) stashes whatever else arrives first and replays
//! the stash on later receives; this reproduces the matching semantics of
//! an MPI-style transport while keeping FIFO order per (source,
//! destination, tag).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender, channel};

use tracing::trace;

use crate::communicator::{Communicator, Tag};
use crate::error::{CommError, CommResult};

/// A tagged message in flight.
struct Envelope {
    src: usize,
    tag: Tag,
    payload: Vec<u8>,
}

/// One rank's endpoint of the in-process transport.
///
/// Endpoints are created as a group with [`ChannelComm::group`] and moved
/// onto their rank's thread; each is used from that single thread only.
pub struct ChannelComm {
    rank: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    stash: RefCell<VecDeque<Envelope>>,
}

impl ChannelComm {
    /// Creates the fully connected endpoints of a `size`-rank group, in
    /// rank order.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn group(size: usize) -> Vec<ChannelComm> {
        assert!(size > 0, "group size must be at least 1");
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| channel()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ChannelComm {
                rank,
                peers: senders.clone(),
                inbox,
                stash: RefCell::new(VecDeque::new()),
            })
            .collect()
    }

    fn check_peer(&self, peer: usize) -> CommResult<()> {
        if peer >= self.peers.len() {
            return Err(CommError::InvalidRank {
                rank: peer,
                size: self.peers.len(),
            });
        }
        if peer == self.rank {
            return Err(CommError::SelfMessage { rank: self.rank });
        }
        Ok(())
    }
}

impl Communicator for ChannelComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> CommResult<()> {
        self.check_peer(dest)?;
        trace!(from = self.rank, to = dest, %tag, bytes = payload.len(), "send");
        self.peers[dest]
            .send(Envelope {
                src: self.rank,
                tag,
                payload: payload.to_vec(),
            })
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    fn recv(&self, src: usize, tag: Tag) -> CommResult<Vec<u8>> {
        self.check_peer(src)?;

        let mut stash = self.stash.borrow_mut();
        let position = stash.iter().position(|e| e.src == src && e.tag == tag);
        if let Some(envelope) = position.and_then(|at| stash.remove(at)) {
            trace!(at = self.rank, from = src, %tag, "recv (stashed)");
            return Ok(envelope.payload);
        }

        loop {
            let envelope = self
                .inbox
                .recv()
                .map_err(|_| CommError::Disconnected { peer: src })?;
            if envelope.src == src && envelope.tag == tag {
                trace!(at = self.rank, from = src, %tag, bytes = envelope.payload.len(), "recv");
                return Ok(envelope.payload);
            }
            stash.push_back(envelope);
        }
    }
}

impl std::fmt::Debug for ChannelComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelComm")
            .field("rank", &self.rank)
            .field("size", &self.peers.len())
            .finish()
    }
}
