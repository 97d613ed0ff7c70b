//! Tag namespace for the composition collectives.
//!
//! Every collective conversation gets its own tag, and binary swap gets a
//! distinct tag per round, so a payload from one round can never satisfy a
//! receive from another.

use sortlast_comm::Tag;

const SWAP_BASE: u32 = 0x100;

/// Tag for binary-swap exchange round `round`.
#[inline]
pub(crate) fn swap_round(round: u32) -> Tag {
    Tag::new(SWAP_BASE + round)
}

/// Tag for direct-send full-image delivery to the owner.
pub(crate) const DIRECT_BLEND: Tag = Tag::new(0x200);

/// Tag for direct-send strip redistribution from the owner.
pub(crate) const DIRECT_SCATTER: Tag = Tag::new(0x201);

/// Tag for gather-to-root strip delivery.
pub(crate) const GATHER: Tag = Tag::new(0x300);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_tags_are_distinct() {
        assert_ne!(swap_round(0), swap_round(1));
        assert_ne!(swap_round(0), DIRECT_BLEND);
        assert_ne!(DIRECT_BLEND, DIRECT_SCATTER);
        assert_ne!(swap_round(31), GATHER);
    }
}
