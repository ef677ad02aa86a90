use ethereum_types::H256;

use crate::miller_rabin::is_prime;
use crate::{
    Error, CACHE_BYTES_GROWTH, CACHE_BYTES_INIT, DATASET_BYTES_GROWTH, DATASET_BYTES_INIT,
    EPOCH_LENGTH, HASH_BYTES, MIX_BYTES,
};

// Prime gaps at these magnitudes are a few hundred at most.
const MAX_SIZE_STEPS: usize = 1 << 16;

/// The epoch a block belongs to.
pub fn epoch(block_number: u64) -> u64 {
    block_number / EPOCH_LENGTH
}

/// Get the cache size in bytes for a given block number.
///
/// The element count (`size / 64`) is the largest prime at or below the
/// epoch's nominal size, so parent selection never falls into short cycles.
pub fn get_cache_size(block_number: u64) -> Result<usize, Error> {
    let epoch = epoch(block_number);
    let nominal = nominal_size(CACHE_BYTES_INIT, CACHE_BYTES_GROWTH, epoch).ok_or(
        Error::SizeOverflow {
            what: "cache",
            epoch,
        },
    )?;
    prime_size(nominal, HASH_BYTES).ok_or(Error::NoPrimeSize {
        what: "cache",
        epoch,
    })
}

/// Get the full dataset size in bytes for a given block number.
///
/// The number of 128-byte mix pages (`size / 128`) is prime.
pub fn get_full_size(block_number: u64) -> Result<usize, Error> {
    let epoch = epoch(block_number);
    let nominal = nominal_size(DATASET_BYTES_INIT, DATASET_BYTES_GROWTH, epoch).ok_or(
        Error::SizeOverflow {
            what: "dataset",
            epoch,
        },
    )?;
    prime_size(nominal, MIX_BYTES).ok_or(Error::NoPrimeSize {
        what: "dataset",
        epoch,
    })
}

fn nominal_size(init: usize, growth: usize, epoch: u64) -> Option<usize> {
    usize::try_from(epoch)
        .ok()?
        .checked_mul(growth)?
        .checked_add(init)
}

fn prime_size(nominal: usize, unit: usize) -> Option<usize> {
    let mut sz = nominal.checked_sub(unit)?;
    for _ in 0..MAX_SIZE_STEPS {
        if is_prime((sz / unit) as u64) {
            return Some(sz);
        }
        sz = sz.checked_sub(2 * unit)?;
    }
    None
}

/// Get the seedhash for a given block number.
///
/// Keccak-256 is applied to 32 zero bytes once per elapsed epoch, so every
/// block of epoch 0 has the all-zero seed.
pub fn get_seedhash(block_number: u64) -> H256 {
    let mut s = [0u8; 32];
    for _ in 0..epoch(block_number) {
        s = crate::keccak_256(&s);
    }
    H256::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_boundaries() {
        assert_eq!(epoch(0), 0);
        assert_eq!(epoch(EPOCH_LENGTH - 1), 0);
        assert_eq!(epoch(EPOCH_LENGTH), 1);
        assert_eq!(epoch(2 * EPOCH_LENGTH + 17), 2);
    }

    #[test]
    fn prime_size_steps_down_by_two_units() {
        // 1024 - 64 = 960 -> 15 nodes, 13 nodes after one step.
        assert_eq!(prime_size(1024, 64), Some(13 * 64));
        assert_eq!(prime_size(64, 64), None);
        assert_eq!(prime_size(0, 64), None);
    }

    #[test]
    fn nominal_size_overflow() {
        assert_eq!(nominal_size(10, 2, 3), Some(16));
        assert_eq!(nominal_size(1, usize::MAX, 1), None);
        assert_eq!(nominal_size(CACHE_BYTES_INIT, CACHE_BYTES_GROWTH, u64::MAX), None);
    }
}
