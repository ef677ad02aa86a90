use byteorder::{ByteOrder, LittleEndian};
use ethereum_types::H256;
use log::debug;

use crate::{fill_sha512, Error, CACHE_ROUNDS, HASH_BYTES};

pub(crate) fn check_cache_size(size: usize) -> Result<(), Error> {
    if size == 0 || size % HASH_BYTES != 0 {
        return Err(Error::InvalidSize {
            what: "cache",
            size,
            align: HASH_BYTES,
        });
    }
    Ok(())
}

/// Make an Fbcash cache using the given seed.
///
/// The buffer is first filled with a Keccak-512 chain starting from the
/// seed, then `CACHE_ROUNDS` passes of RandMemoHash rewrite every node from
/// its left neighbour XORed with a node picked by its own first word.
pub fn make_cache(cache: &mut [u8], seed: H256) -> Result<(), Error> {
    check_cache_size(cache.len())?;
    let n = cache.len() / HASH_BYTES;

    fill_sha512(seed.as_bytes(), cache, 0);
    for i in 1..n {
        let (last, next) = cache.split_at_mut(i * HASH_BYTES);
        fill_sha512(&last[(last.len() - HASH_BYTES)..], next, 0);
    }

    for _ in 0..CACHE_ROUNDS {
        for i in 0..n {
            let v = (LittleEndian::read_u32(&cache[(i * HASH_BYTES)..]) as usize) % n;
            let left = ((n + i - 1) % n) * HASH_BYTES;
            let mut r = [0u8; HASH_BYTES];
            for (j, b) in r.iter_mut().enumerate() {
                *b = cache[left + j] ^ cache[v * HASH_BYTES + j];
            }
            fill_sha512(&r, cache, i * HASH_BYTES);
        }
    }
    Ok(())
}

/// Allocate and build a cache of `cache_size` bytes.
///
/// Nothing is returned unless the whole cache was built.
pub fn new_cache(cache_size: usize, seed: H256) -> Result<Vec<u8>, Error> {
    check_cache_size(cache_size)?;
    let mut cache = Vec::new();
    cache
        .try_reserve_exact(cache_size)
        .map_err(|_| Error::Allocation(cache_size))?;
    cache.resize(cache_size, 0);

    debug!("generating cache of {} bytes for seed {:?}", cache_size, seed);
    make_cache(&mut cache, seed)?;
    debug!("cache for seed {:?} is ready", seed);
    Ok(cache)
}
