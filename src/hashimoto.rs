use byteorder::{ByteOrder, LittleEndian};
use ethereum_types::{H256, H512};
use sha3::{Digest, Keccak256, Keccak512};

use crate::dataset::{calc_dataset_item, check_full_size};
use crate::{
    fnv, fnv_words, Error, ACCESSES, HASH_BYTES, MIX_BYTES, MIX_NODES, MIX_WORDS, NODE_WORDS,
    WORD_BYTES,
};

/// Output of one hashimoto run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashResult {
    /// Compressed mix, the digest carried in a block seal.
    pub mix_hash: H256,
    /// Value compared against the difficulty boundary.
    pub result: H256,
}

/// Keccak-512 of the header hash followed by the little-endian nonce.
pub(crate) fn seed_hash(header_hash: H256, nonce: u64) -> [u8; 64] {
    let mut hasher = Keccak512::default();
    hasher.update(header_hash.as_bytes());
    hasher.update(nonce.to_le_bytes());
    let mut s = [0u8; 64];
    s.copy_from_slice(&hasher.finalize());
    s
}

/// Keccak-256 of the seed hash followed by the mix digest.
pub(crate) fn final_hash(seed: &[u8; 64], mix_hash: &H256) -> H256 {
    let mut hasher = Keccak256::default();
    hasher.update(seed);
    hasher.update(mix_hash.as_bytes());
    let mut z = [0u8; 32];
    z.copy_from_slice(&hasher.finalize());
    H256::from(z)
}

/// "Main" function of Fbcash, calculating the mix digest and result given
/// the header hash and nonce.
///
/// `lookup` serves dataset nodes by index; `None` means the node is out of
/// reach and the run fails with [`Error::Accessor`]. A nonce that does not
/// meet any difficulty still yields `Ok`.
pub fn hashimoto<F>(
    header_hash: H256,
    nonce: u64,
    full_size: usize,
    lookup: F,
) -> Result<HashResult, Error>
where
    F: Fn(usize) -> Option<H512>,
{
    check_full_size(full_size)?;
    let pages = full_size / MIX_BYTES;

    let s = seed_hash(header_hash, nonce);
    let seed_head = LittleEndian::read_u32(&s);

    let mut mix = [0u32; MIX_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = LittleEndian::read_u32(&s[((i % NODE_WORDS) * WORD_BYTES)..]);
    }

    for i in 0..ACCESSES {
        let p = fnv(i as u32 ^ seed_head, mix[i % MIX_WORDS]) as usize % pages;
        for (n, words) in mix.chunks_exact_mut(NODE_WORDS).enumerate() {
            let index = p * MIX_NODES + n;
            let node = lookup(index).ok_or(Error::Accessor(index))?;
            fnv_words(words, node.as_bytes());
        }
    }

    let mut cmix = [0u8; MIX_BYTES / 4];
    for (i, words) in mix.chunks_exact(4).enumerate() {
        let reduced = fnv(fnv(fnv(words[0], words[1]), words[2]), words[3]);
        LittleEndian::write_u32(&mut cmix[(i * WORD_BYTES)..], reduced);
    }
    let mix_hash = H256::from(cmix);
    let result = final_hash(&s, &mix_hash);

    Ok(HashResult { mix_hash, result })
}

/// Fbcash used by a light client. Only stores the cache rather than the
/// full dataset; every access recomputes its node.
pub fn hashimoto_light(
    header_hash: H256,
    nonce: u64,
    full_size: usize,
    cache: &[u8],
) -> Result<HashResult, Error> {
    crate::cache::check_cache_size(cache.len())?;
    hashimoto(header_hash, nonce, full_size, |i| {
        u32::try_from(i).ok().map(|i| calc_dataset_item(cache, i))
    })
}

/// Fbcash used by a full client. Reads nodes from the materialized dataset.
pub fn hashimoto_full(
    header_hash: H256,
    nonce: u64,
    full_size: usize,
    dataset: &[u8],
) -> Result<HashResult, Error> {
    hashimoto(header_hash, nonce, full_size, |i| {
        let start = i.checked_mul(HASH_BYTES)?;
        dataset.get(start..(start + HASH_BYTES)).map(H512::from_slice)
    })
}
