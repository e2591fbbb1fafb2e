//! Deterministic seed derivation for chains and move proposals.

use mpp_core::derive_substream_seed;

/// Derives the root seed for a specific chain.
pub fn chain_seed(master_seed: u64, chain_index: usize) -> u64 {
    derive_substream_seed(master_seed, chain_index as u64)
}

/// Derives the seed for one move proposal within a sweep of a chain.
pub fn move_seed(chain_root: u64, sweep: usize, move_slot: usize) -> u64 {
    let intermediate = derive_substream_seed(chain_root, sweep as u64);
    derive_substream_seed(intermediate, move_slot as u64)
}
