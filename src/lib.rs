//! Apache-2 licensed Fbcash implementation.
//!
//! Fbcash is an Ethash-family memory-hard proof of work. A small cache is
//! derived per epoch from a seed hash; every node of the large dataset (the
//! DAG) is a pure function of that cache. Verification mixes a header hash
//! and nonce against 64 pseudo-random dataset pages, either read from a
//! materialized [`Full`] dataset or recomputed on demand from a [`Light`]
//! cache. Both paths give byte-identical results.
//!
//! ```no_run
//! use ethereum_types::H256;
//!
//! let light = fbcash::Light::new(0).unwrap();
//! let light_out = light.compute(H256::zero(), 0).unwrap();
//!
//! let full = fbcash::Full::new(light, |_percent| 0).unwrap();
//! assert_eq!(full.compute(H256::zero(), 0).unwrap(), light_out);
//! ```

// The reference algorithm used is from https://github.com/ethereum/wiki/wiki/Ethash

mod cache;
mod dag;
mod dataset;
mod difficulty;
mod engine;
mod epoch;
mod error;
mod hashimoto;
mod io;
mod miller_rabin;

pub use cache::{make_cache, new_cache};
pub use dag::{Full, FullError, Light};
pub use dataset::{calc_dataset_item, compute_full_data, make_dataset};
pub use difficulty::{
    boundary_for, check_difficulty, cross_boundary, quick_check_difficulty, quick_hash,
};
pub use engine::{Config, Fbcash, PowMode, VerifyError};
pub use epoch::{epoch, get_cache_size, get_full_size, get_seedhash};
pub use error::Error;
pub use hashimoto::{hashimoto, hashimoto_full, hashimoto_light, HashResult};
pub use io::{read_dataset, write_dataset, DAG_MAGIC_NUM, DAG_MAGIC_NUM_SIZE};

use byteorder::{ByteOrder, LittleEndian};
use sha3::{Digest, Keccak256, Keccak512};

pub const REVISION: u32 = 23;
pub const EPOCH_LENGTH: u64 = 30_000;
pub const DATASET_BYTES_INIT: usize = 1_073_741_824; // 2 to the power of 30.
pub const DATASET_BYTES_GROWTH: usize = 8_388_608; // 2 to the power of 23.
pub const CACHE_BYTES_INIT: usize = 16_777_216; // 2 to the power of 24.
pub const CACHE_BYTES_GROWTH: usize = 131_072; // 2 to the power of 17.
pub const MIX_BYTES: usize = 128;
pub const WORD_BYTES: usize = 4;
pub const HASH_BYTES: usize = 64;
pub const NODE_WORDS: usize = HASH_BYTES / WORD_BYTES;
pub const MIX_WORDS: usize = MIX_BYTES / WORD_BYTES;
pub const MIX_NODES: usize = MIX_WORDS / NODE_WORDS;
pub const DATASET_PARENTS: u32 = 256;
pub const CACHE_ROUNDS: usize = 3;
pub const ACCESSES: usize = 64;

/// Cache size used by [`PowMode::Test`] regardless of the block number.
pub const TEST_CACHE_BYTES: usize = 1024;
/// Dataset size used by [`PowMode::Test`] regardless of the block number.
pub const TEST_DATASET_BYTES: usize = 32 * 1024;

const FNV_PRIME: u32 = 0x01000193;

/// The FNV-style combine used for parent selection and for mixing.
#[inline]
pub fn fnv(v1: u32, v2: u32) -> u32 {
    v1.wrapping_mul(FNV_PRIME) ^ v2
}

/// Folds the little-endian words of `data` into `mix` with [`fnv`].
#[inline]
fn fnv_words(mix: &mut [u32], data: &[u8]) {
    for (i, word) in mix.iter_mut().enumerate() {
        *word = fnv(*word, LittleEndian::read_u32(&data[i * WORD_BYTES..]));
    }
}

pub fn keccak_512(data: &[u8]) -> [u8; 64] {
    let mut output = [0u8; 64];
    output.copy_from_slice(&Keccak512::digest(data));
    output
}

pub fn keccak_256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Keccak256::digest(data));
    output
}

fn fill_sha512(input: &[u8], a: &mut [u8], from_index: usize) {
    let out = Keccak512::digest(input);
    a[from_index..from_index + out.len()].copy_from_slice(&out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn fnv_wraps_at_32_bits() {
        assert_eq!(fnv(0, 0), 0);
        assert_eq!(fnv(1, 0), FNV_PRIME);
        assert_eq!(fnv(1, 1), FNV_PRIME ^ 1);
        assert_eq!(fnv(u32::MAX, 0), u32::MAX.wrapping_mul(FNV_PRIME));
    }

    #[test]
    fn keccak_is_pre_standard() {
        assert_eq!(
            keccak_256(&[]),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn mix_layout() {
        assert_eq!(NODE_WORDS, 16);
        assert_eq!(MIX_WORDS, 32);
        assert_eq!(MIX_NODES, 2);
    }
}
