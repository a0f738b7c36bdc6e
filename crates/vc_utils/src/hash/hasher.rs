//! Seeded hashing for name-keyed tables.
//!
//! Property names, class names and method keys are hashed with one
//! process-independent seed, so iteration-free lookups behave the same
//! across runs.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

const SEED: u64 = 0x95EE_04C4_F326_B271;

const STATE: FixedState = FixedState::with_seed(SEED);

/// The hasher built by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Builds [`FixedHasher`]s sharing one seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use vc_utils::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("name"), FixedHashState.hash_one("name"));
/// assert_ne!(FixedHashState.hash_one("name"), FixedHashState.hash_one("age"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        STATE.build_hasher()
    }
}
