//! The messaging contract the compositors are written against.
//!
//! A [`Communicator`] represents one rank's membership in a fixed group of
//! P single-threaded ranks. It offers reliable, FIFO-per-(source,
//! destination, tag) point-to-point byte transfer and nothing else; the
//! collectives (binary swap, direct send, gather) are built on top of it
//! in `sortlast-compose`. The provided implementation is the in-process
//! [`ChannelComm`](crate::channel::ChannelComm); a wire transport would
//! slot in at this seam.

use crate::error::CommResult;

/// Message tag separating concurrent conversations between the same pair
/// of ranks.
///
/// Collectives derive a unique tag per round so a message from round k can
/// never satisfy a receive from round k+1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(u32);

impl Tag {
    /// Creates a tag from a raw namespace value.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw namespace value.
    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One rank's handle on the group.
///
/// # Contract
///
/// - `rank` and `size` are constant for the lifetime of the group; every
///   rank observes the same `size`.
/// - Delivery is reliable and FIFO per (source, destination, tag) triple.
/// - `recv` blocks until a matching message arrives; there are no
///   timeouts and no cancellation. A vanished peer is reported as an
///   error where the transport can detect it, and may otherwise leave the
///   caller blocked.
/// - Payloads are opaque bytes; the caller owns serialization.
pub trait Communicator {
    /// This rank's index in `[0, size)`.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Delivers `payload` to `dest` under `tag`. Does not block on the
    /// receiver.
    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> CommResult<()>;

    /// Blocks until a message from `src` under `tag` arrives and returns
    /// its payload.
    fn recv(&self, src: usize, tag: Tag) -> CommResult<Vec<u8>>;

    /// Symmetric pairwise exchange: sends `payload` to `peer` and
    /// receives `peer`'s payload under the same tag.
    ///
    /// Both sides of a pair call this with matching tags. The outgoing
    /// buffer and the returned incoming buffer are always disjoint
    /// allocations.
    fn exchange(&self, peer: usize, tag: Tag, payload: &[u8]) -> CommResult<Vec<u8>> {
        self.send(peer, tag, payload)?;
        self.recv(peer, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        let tag = Tag::new(0x104);
        assert_eq!(tag.raw(), 0x104);
        assert_eq!(tag.to_string(), "0x104");
        assert_eq!(tag, Tag::new(0x104));
        assert_ne!(tag, Tag::new(0x105));
    }
}
