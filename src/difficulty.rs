use ethereum_types::{BigEndianHash, H256, U256};

use crate::hashimoto::{final_hash, seed_hash};

/// Returns whether `hash` is less than or equal to `boundary`, both read as
/// big-endian 256-bit integers.
pub fn check_difficulty(hash: &H256, boundary: &H256) -> bool {
    hash.into_uint() <= boundary.into_uint()
}

/// Recompute the hashimoto result from a claimed mix digest.
///
/// This costs two Keccak calls and no dataset access. It equals the real
/// result only when `mix_hash` is genuine.
pub fn quick_hash(header_hash: &H256, nonce: u64, mix_hash: &H256) -> H256 {
    final_hash(&seed_hash(*header_hash, nonce), mix_hash)
}

/// Difficulty quick check for PoW pre-verification.
///
/// Anyone can pick a `mix_hash` that passes, so a `true` here only admits
/// the seal to a light or full verification that recomputes the mix.
pub fn quick_check_difficulty(
    header_hash: &H256,
    nonce: u64,
    mix_hash: &H256,
    boundary: &H256,
) -> bool {
    check_difficulty(&quick_hash(header_hash, nonce, mix_hash), boundary)
}

/// Compute `2^256 / val`, saturating to `U256::MAX` for `val <= 1`.
pub fn cross_boundary(val: U256) -> U256 {
    if val <= U256::one() {
        U256::max_value()
    } else {
        ((U256::one() << 255) / val) << 1
    }
}

/// The boundary for a difficulty, as a big-endian hash.
pub fn boundary_for(difficulty: U256) -> H256 {
    H256::from_uint(&cross_boundary(difficulty))
}
