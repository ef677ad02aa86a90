use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use byteorder::{ByteOrder, LittleEndian};
use ethereum_types::H512;
use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    fnv, fnv_words, keccak_512, Error, DATASET_PARENTS, HASH_BYTES, MIX_BYTES, NODE_WORDS,
};

// Progress is reported at the start of each of roughly this many chunks.
const PROGRESS_STEPS: usize = 100;

/// Calculate one 64-byte dataset node from the cache.
///
/// # Panics
///
/// Panics if `cache` holds no complete node.
pub fn calc_dataset_item(cache: &[u8], node_index: u32) -> H512 {
    let n = (cache.len() / HASH_BYTES) as u32;
    let init = (node_index % n) as usize * HASH_BYTES;

    let mut mix = [0u8; HASH_BYTES];
    mix.copy_from_slice(&cache[init..(init + HASH_BYTES)]);
    let head = LittleEndian::read_u32(&mix) ^ node_index;
    LittleEndian::write_u32(&mut mix, head);

    let mut words = [0u32; NODE_WORDS];
    LittleEndian::read_u32_into(&keccak_512(&mix), &mut words);
    for j in 0..DATASET_PARENTS {
        let parent = fnv(node_index ^ j, words[j as usize % NODE_WORDS]) % n;
        let offset = parent as usize * HASH_BYTES;
        fnv_words(&mut words, &cache[offset..(offset + HASH_BYTES)]);
    }
    LittleEndian::write_u32_into(&words, &mut mix);
    H512::from(keccak_512(&mix))
}

pub(crate) fn check_full_size(size: usize) -> Result<(), Error> {
    let nodes = size / HASH_BYTES;
    if size == 0 || size % MIX_BYTES != 0 || nodes > u32::MAX as usize + 1 {
        return Err(Error::InvalidSize {
            what: "dataset",
            size,
            align: MIX_BYTES,
        });
    }
    Ok(())
}

/// Make an Fbcash dataset using the given cache, one node after another.
pub fn make_dataset(dataset: &mut [u8], cache: &[u8]) -> Result<(), Error> {
    compute_full_data(dataset, cache, |_| 0)
}

/// Fill `dataset` with every node derived from `cache`.
///
/// Nodes are independent, so the buffer is cut into disjoint chunks that are
/// filled in parallel when the `parallel` feature is on. `callback` receives
/// a percentage at the start of every chunk, the first call being `0`;
/// calls are serialized. A non-zero return stops all workers and the call
/// fails with [`Error::Cancelled`], leaving `dataset` partially written.
pub fn compute_full_data<F>(dataset: &mut [u8], cache: &[u8], callback: F) -> Result<(), Error>
where
    F: Fn(u32) -> i32 + Sync,
{
    check_full_size(dataset.len())?;
    crate::cache::check_cache_size(cache.len())?;

    let node_count = dataset.len() / HASH_BYTES;
    let chunk_nodes = (node_count / PROGRESS_STEPS).max(1);
    let cancelled = AtomicBool::new(false);
    let completed = AtomicUsize::new(0);
    let reporter = Mutex::new(());

    debug!(
        "generating {} dataset nodes in chunks of {}",
        node_count, chunk_nodes
    );

    let report = || -> Result<(), Error> {
        let _guard = reporter.lock().unwrap_or_else(PoisonError::into_inner);
        if cancelled.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        let done = completed.load(Ordering::Relaxed);
        let percent = ((done * 100 + node_count - 1) / node_count) as u32;
        if callback(percent) != 0 {
            warn!("dataset generation cancelled at {}%", percent);
            cancelled.store(true, Ordering::Relaxed);
            return Err(Error::Cancelled);
        }
        debug!("dataset generation at {}%", percent);
        Ok(())
    };

    let fill = |(chunk_index, chunk): (usize, &mut [u8])| -> Result<(), Error> {
        report()?;
        let first = chunk_index * chunk_nodes;
        for (offset, node) in chunk.chunks_exact_mut(HASH_BYTES).enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            let item = calc_dataset_item(cache, (first + offset) as u32);
            node.copy_from_slice(item.as_bytes());
        }
        completed.fetch_add(chunk.len() / HASH_BYTES, Ordering::Relaxed);
        Ok(())
    };

    #[cfg(feature = "parallel")]
    dataset
        .par_chunks_mut(chunk_nodes * HASH_BYTES)
        .enumerate()
        .try_for_each(fill)?;
    #[cfg(not(feature = "parallel"))]
    dataset
        .chunks_mut(chunk_nodes * HASH_BYTES)
        .enumerate()
        .try_for_each(fill)?;

    debug!("generated {} dataset nodes", node_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_cache;
    use ethereum_types::H256;
    use hex_literal::hex;
    use std::sync::Mutex;

    fn tiny_cache() -> Vec<u8> {
        new_cache(1024, H256::zero()).unwrap()
    }

    #[test]
    fn first_item_of_tiny_cache() {
        let cache = tiny_cache();
        assert_eq!(
            calc_dataset_item(&cache, 0),
            H512::from(hex!("4bc09fbd530a041dd2ec296110a29e8f130f179c59d223f51ecce3126e8b0c74326abc2f32ccd9d7f976bd0944e3ccf8479db39343cbbffa467046ca97e2da63"))
        );
    }

    #[test]
    fn items_wrap_around_the_cache() {
        let cache = tiny_cache();
        // Indices past the cache still pick a distinct seed through the XOR.
        assert_ne!(calc_dataset_item(&cache, 0), calc_dataset_item(&cache, 16));
        assert_eq!(calc_dataset_item(&cache, 16), calc_dataset_item(&cache, 16));
    }

    #[test]
    fn dataset_matches_items() {
        let cache = tiny_cache();
        let mut dataset = vec![0u8; 32 * 1024];
        make_dataset(&mut dataset, &cache).unwrap();
        for i in [0usize, 1, 255, 511] {
            let item = calc_dataset_item(&cache, i as u32);
            assert_eq!(&dataset[i * 64..(i + 1) * 64], item.as_bytes());
        }
        assert_eq!(
            crate::keccak_256(&dataset),
            hex!("29929d8f6b3dfd631e20b924c42ec55b818977b40a4a85146a6a920a5d51dcec")
        );
    }

    #[test]
    fn progress_starts_at_zero_and_stays_below_or_at_100() {
        let cache = tiny_cache();
        let mut dataset = vec![0u8; 32 * 1024];
        let seen = Mutex::new(Vec::new());
        compute_full_data(&mut dataset, &cache, |p| {
            seen.lock().unwrap().push(p);
            0
        })
        .unwrap();
        let seen = seen.into_inner().unwrap();
        // 512 nodes in chunks of 5.
        assert_eq!(seen.len(), 103);
        assert_eq!(seen[0], 0);
        assert!(seen.iter().all(|&p| p <= 100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rejects_bad_sizes() {
        let cache = tiny_cache();
        let mut dataset = vec![0u8; 64];
        assert!(matches!(
            make_dataset(&mut dataset, &cache),
            Err(Error::InvalidSize { what: "dataset", .. })
        ));
        let mut dataset = vec![0u8; 128];
        assert!(matches!(
            make_dataset(&mut dataset, &cache[..100]),
            Err(Error::InvalidSize { what: "cache", .. })
        ));
    }
}
