use std::sync::Arc;

use ethereum_types::{H256, U256};
use log::{debug, trace, warn};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    boundary_for, check_difficulty, epoch, quick_check_difficulty, Error, Full, Light,
    TEST_CACHE_BYTES, TEST_DATASET_BYTES,
};

/// Which sizes the engine derives caches and datasets with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowMode {
    /// Epoch sizes from [`get_cache_size`](crate::get_cache_size) and
    /// [`get_full_size`](crate::get_full_size).
    #[default]
    Normal,
    /// Fixed 1 KiB cache and 32 KiB dataset for every epoch.
    Test,
    /// Test sizes, and every seal is accepted without checking.
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: PowMode,
    /// Number of epoch caches kept in memory.
    pub caches_in_mem: u64,
    /// Number of full datasets kept in memory.
    pub datasets_in_mem: u64,
    /// Dataset generation workers, `None` for one per CPU.
    pub threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: PowMode::Normal,
            caches_in_mem: 2,
            datasets_in_mem: 1,
            threads: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("non-positive difficulty")]
    ZeroDifficulty,
    #[error("invalid mix digest")]
    InvalidMixDigest,
    #[error("invalid proof-of-work")]
    InvalidPow,
    #[error(transparent)]
    Build(#[from] Error),
}

/// Proof-of-work engine keeping the caches and datasets of recent epochs.
pub struct Fbcash {
    config: Config,
    lights: Cache<u64, Arc<Light>>,
    fulls: Cache<u64, Arc<Full>>,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl Fbcash {
    pub fn new(config: Config) -> Result<Self, Error> {
        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads.unwrap_or_else(num_cpus::get))
            .thread_name(|i| format!("fbcash-dag-{}", i))
            .build()?;
        if config.mode == PowMode::Fake {
            warn!("fbcash used in fake mode, seals are not checked");
        }
        Ok(Self {
            lights: Cache::new(config.caches_in_mem),
            fulls: Cache::new(config.datasets_in_mem),
            config,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn sizes(&self, block_number: u64) -> Result<(usize, usize), Error> {
        match self.config.mode {
            PowMode::Normal => Ok((
                crate::get_cache_size(block_number)?,
                crate::get_full_size(block_number)?,
            )),
            PowMode::Test | PowMode::Fake => Ok((TEST_CACHE_BYTES, TEST_DATASET_BYTES)),
        }
    }

    /// The light handle for the epoch of `block_number`, built on first use.
    pub fn light(&self, block_number: u64) -> Result<Arc<Light>, Error> {
        let epoch = epoch(block_number);
        if let Some(light) = self.lights.get(&epoch) {
            trace!("cache hit for epoch {}", epoch);
            return Ok(light);
        }
        debug!("cache miss for epoch {}", epoch);
        let (cache_size, full_size) = self.sizes(block_number)?;
        let light = Arc::new(Light::with_sizes(block_number, cache_size, full_size)?);
        self.lights.insert(epoch, Arc::clone(&light));
        Ok(light)
    }

    /// The full dataset for the epoch of `block_number`, generated on the
    /// engine's workers on first use. `callback` only runs when generating.
    pub fn full<F>(&self, block_number: u64, callback: F) -> Result<Arc<Full>, Error>
    where
        F: Fn(u32) -> i32 + Sync + Send,
    {
        let epoch = epoch(block_number);
        if let Some(full) = self.fulls.get(&epoch) {
            trace!("dataset hit for epoch {}", epoch);
            return Ok(full);
        }
        debug!("dataset miss for epoch {}", epoch);
        // The dataset owns its own copy of the cache.
        let light = Light::clone(&*self.light(block_number)?);
        #[cfg(feature = "parallel")]
        let full = self.pool.install(move || Full::new(light, callback));
        #[cfg(not(feature = "parallel"))]
        let full = Full::new(light, callback);
        let full = Arc::new(full.map_err(|e| e.error)?);
        self.fulls.insert(epoch, Arc::clone(&full));
        Ok(full)
    }

    /// Check a block seal: the quick check first, then a light recomputation
    /// of the mix digest and the result.
    pub fn verify_seal(
        &self,
        block_number: u64,
        header_hash: H256,
        nonce: u64,
        mix_hash: H256,
        difficulty: U256,
    ) -> Result<(), VerifyError> {
        if self.config.mode == PowMode::Fake {
            return Ok(());
        }
        if difficulty.is_zero() {
            return Err(VerifyError::ZeroDifficulty);
        }
        let boundary = boundary_for(difficulty);
        if !quick_check_difficulty(&header_hash, nonce, &mix_hash, &boundary) {
            return Err(VerifyError::InvalidPow);
        }

        let out = self.light(block_number)?.compute(header_hash, nonce)?;
        if out.mix_hash != mix_hash {
            return Err(VerifyError::InvalidMixDigest);
        }
        if !check_difficulty(&out.result, &boundary) {
            return Err(VerifyError::InvalidPow);
        }
        Ok(())
    }
}
