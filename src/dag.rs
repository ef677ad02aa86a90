use std::fmt;

use ethereum_types::H256;
use log::info;
use thiserror::Error;

use crate::dataset::check_full_size;
use crate::{check_difficulty, Error, HashResult};

/// Verification handle holding one epoch's cache.
///
/// Dataset nodes are derived from the cache on every access, which keeps
/// memory small at the cost of 256 cache reads per node.
#[derive(Clone)]
pub struct Light {
    block_number: u64,
    cache: Vec<u8>,
    full_size: usize,
}

impl Light {
    /// Build the cache for the epoch of `block_number`.
    pub fn new(block_number: u64) -> Result<Self, Error> {
        let cache_size = crate::get_cache_size(block_number)?;
        let full_size = crate::get_full_size(block_number)?;
        Self::with_sizes(block_number, cache_size, full_size)
    }

    /// Build a cache of explicit sizes, seeded from the epoch of `block_number`.
    ///
    /// Only alignment is checked here, so non-prime test sizes are accepted.
    pub fn with_sizes(
        block_number: u64,
        cache_size: usize,
        full_size: usize,
    ) -> Result<Self, Error> {
        check_full_size(full_size)?;
        let seed = crate::get_seedhash(block_number);
        let cache = crate::new_cache(cache_size, seed)?;
        info!(
            "built cache for epoch {} ({} bytes, dataset {} bytes)",
            crate::epoch(block_number),
            cache_size,
            full_size
        );
        Ok(Self {
            block_number,
            cache,
            full_size,
        })
    }

    pub fn compute(&self, header_hash: H256, nonce: u64) -> Result<HashResult, Error> {
        self.compute_with_full_size(self.full_size, header_hash, nonce)
    }

    /// Light computation against a dataset size other than the epoch's.
    pub fn compute_with_full_size(
        &self,
        full_size: usize,
        header_hash: H256,
        nonce: u64,
    ) -> Result<HashResult, Error> {
        crate::hashimoto_light(header_hash, nonce, full_size, &self.cache)
    }

    pub fn is_valid_for(&self, block_number: u64) -> bool {
        crate::epoch(block_number) == self.epoch()
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn epoch(&self) -> u64 {
        crate::epoch(self.block_number)
    }

    pub fn cache(&self) -> &[u8] {
        &self.cache
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn full_size(&self) -> usize {
        self.full_size
    }
}

impl fmt::Debug for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("block_number", &self.block_number)
            .field("cache_size", &self.cache.len())
            .field("full_size", &self.full_size)
            .finish()
    }
}

/// A failed [`Full`] construction. The cache goes back to the caller.
#[derive(Debug, Error)]
#[error("failed to build the full dataset: {error}")]
pub struct FullError {
    #[source]
    pub error: Error,
    pub light: Light,
}

impl FullError {
    pub fn into_light(self) -> Light {
        self.light
    }
}

/// Mining handle owning the cache and the materialized dataset.
pub struct Full {
    light: Light,
    dataset: Vec<u8>,
}

impl Full {
    /// Generate the dataset for `light`'s epoch, taking ownership of the
    /// cache only on success.
    ///
    /// `callback` gets a completion percentage and returns non-zero to
    /// abort; see [`compute_full_data`](crate::compute_full_data). A
    /// reported 100 does not mean the dataset is done, only `Ok` does.
    pub fn new<F>(light: Light, callback: F) -> Result<Self, FullError>
    where
        F: Fn(u32) -> i32 + Sync,
    {
        let full_size = light.full_size;
        let mut dataset = Vec::new();
        if dataset.try_reserve_exact(full_size).is_err() {
            return Err(FullError {
                error: Error::Allocation(full_size),
                light,
            });
        }
        dataset.resize(full_size, 0);

        info!(
            "generating dataset for epoch {} ({} bytes)",
            light.epoch(),
            full_size
        );
        if let Err(error) = crate::compute_full_data(&mut dataset, &light.cache, callback) {
            return Err(FullError { error, light });
        }
        info!("dataset for epoch {} is ready", light.epoch());
        Ok(Self { light, dataset })
    }

    /// Adopt a dataset produced elsewhere, e.g. by [`read_dataset`](crate::read_dataset).
    ///
    /// Only the length is checked against the epoch.
    pub fn from_dataset(light: Light, dataset: Vec<u8>) -> Result<Self, FullError> {
        if dataset.len() != light.full_size {
            return Err(FullError {
                error: Error::LengthMismatch {
                    what: "dataset",
                    size: dataset.len(),
                    expected: light.full_size,
                },
                light,
            });
        }
        Ok(Self { light, dataset })
    }

    pub fn compute(&self, header_hash: H256, nonce: u64) -> Result<HashResult, Error> {
        crate::hashimoto_full(header_hash, nonce, self.dataset.len(), &self.dataset)
    }

    /// Try up to `attempts` nonces from `start_nonce`, wrapping at `u64::MAX`,
    /// and return the first whose result is within `boundary`.
    pub fn mine(
        &self,
        header_hash: H256,
        start_nonce: u64,
        boundary: &H256,
        attempts: u64,
    ) -> Result<Option<(u64, HashResult)>, Error> {
        let mut nonce = start_nonce;
        for _ in 0..attempts {
            let out = self.compute(header_hash, nonce)?;
            if check_difficulty(&out.result, boundary) {
                return Ok(Some((nonce, out)));
            }
            nonce = nonce.wrapping_add(1);
        }
        Ok(None)
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    /// Release the dataset and keep the cache.
    pub fn into_light(self) -> Light {
        self.light
    }

    pub fn dag(&self) -> &[u8] {
        &self.dataset
    }

    pub fn dag_size(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_valid_for(&self, block_number: u64) -> bool {
        self.light.is_valid_for(block_number)
    }
}

impl fmt::Debug for Full {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full")
            .field("light", &self.light)
            .field("dag_size", &self.dataset.len())
            .finish()
    }
}
