use thiserror::Error;

/// Failures surfaced by cache, dataset and hashimoto computations.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing buffer for a cache or dataset could not be reserved.
    #[error("failed to allocate {0} bytes")]
    Allocation(usize),
    /// A cache or dataset size is zero or not aligned to its unit.
    #[error("invalid {what} size {size}: must be a non-zero multiple of {align} bytes")]
    InvalidSize {
        what: &'static str,
        size: usize,
        align: usize,
    },
    /// A cache or dataset does not have the length its epoch calls for.
    #[error("{what} is {size} bytes, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        size: usize,
        expected: usize,
    },
    /// The nominal size for an epoch does not fit in `usize`.
    #[error("{what} size for epoch {epoch} overflows")]
    SizeOverflow { what: &'static str, epoch: u64 },
    /// The downward search for a prime-sized buffer ran out of steps.
    #[error("no prime {what} size found for epoch {epoch}")]
    NoPrimeSize { what: &'static str, epoch: u64 },
    /// The progress callback asked dataset generation to stop.
    #[error("dataset generation cancelled by the progress callback")]
    Cancelled,
    /// The node accessor could not serve a dataset index.
    #[error("dataset node {0} is not available")]
    Accessor(usize),
    #[cfg(feature = "parallel")]
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
