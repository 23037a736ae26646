//! Bit-sliced proof-of-work search
//!
//! A mining session has three phases:
//!
//! 1. **Init**: absorb the 2,430-tryte header once with the scalar Curl
//!    and broadcast the resulting capacity into a lane-word mid-state.
//! 2. **Search**: for each batch offset, load `lanes` consecutive nonces
//!    (one per lane), then absorb nonce, trunk and branch with three
//!    bit-sliced permutations and test the digest tail of every lane.
//! 3. **Finalize**: add the winning offset to the starting nonce and
//!    splice it back into the transaction.
//!
//! Expected work is about `3^min_weight_magnitude` nonces. The search
//! has no time bound; it ends on a solution, on cancellation, or when
//! the 64-bit offset runs out.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bitslice::{BitslicedCurl, Lanes};
use crate::config::{PowConfig, check_lanes, check_min_weight_magnitude};
use crate::curl::Curl;
use crate::error::{PowError, Result};
use crate::params::{HASH_LENGTH, STATE_LENGTH};
use crate::sponge::Sponge;
use crate::ternary::{self, Trit};
use crate::transaction::Transaction;

/// Nothing found yet. Never a real answer: a batch is only searched if
/// `offset + lanes` fits in a `u64`, so winners stay below `u64::MAX`.
const NOT_FOUND: u64 = u64::MAX;

/// Nonce searcher for one transaction
///
/// `W` sets the word width, and with it the maximum batch size; `u64`
/// runs 32 candidates per batch. The mid-state is computed once in
/// [`Miner::new`] and only read afterwards, so a `Miner` can be shared
/// by reference between worker threads.
#[derive(Clone)]
pub struct Miner<W: Lanes = u64> {
    mid_state: [W; STATE_LENGTH],
    nonce: [Trit; HASH_LENGTH],
    trunk: [Trit; HASH_LENGTH],
    branch: [Trit; HASH_LENGTH],
    lanes: usize,
    transaction: Transaction,
}

fn field(trits: &[Trit]) -> [Trit; HASH_LENGTH] {
    let mut out = [0; HASH_LENGTH];
    out.copy_from_slice(trits);
    out
}

impl<W: Lanes> Miner<W> {
    /// Absorb the header and prepare the mid-state.
    ///
    /// Uses every lane of `W` until [`Miner::with_lanes`] says otherwise.
    pub fn new(transaction: &Transaction) -> Self {
        let mut curl = Curl::new();
        curl.absorb(transaction.header_trits());

        // The rate is rewritten by every batch, only the capacity carries over
        let mut mid_state = [W::LOW; STATE_LENGTH];
        for (word, &trit) in mid_state
            .iter_mut()
            .zip(curl.state())
            .skip(HASH_LENGTH)
        {
            *word = W::broadcast(trit);
        }

        Self {
            mid_state,
            nonce: field(transaction.nonce_trits()),
            trunk: field(transaction.trunk_trits()),
            branch: field(transaction.branch_trits()),
            lanes: W::LANES,
            transaction: transaction.clone(),
        }
    }

    /// Limit each batch to the first `lanes` lanes of the word.
    pub fn with_lanes(mut self, lanes: usize) -> Result<Self> {
        check_lanes(lanes, W::LANES)?;
        self.lanes = lanes;
        Ok(self)
    }

    /// Nonce candidates per batch.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// The transaction being mined.
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Mid-state lane words after the header.
    pub fn mid_state(&self) -> &[W; STATE_LENGTH] {
        &self.mid_state
    }

    /// Try the nonces `nonce + offset .. nonce + offset + lanes`.
    ///
    /// Returns the lowest absolute offset whose digest ends in
    /// `min_weight_magnitude` zero trits.
    ///
    /// # Panics
    ///
    /// Panics if `min_weight_magnitude` exceeds 243 or if
    /// `offset + lanes` overflows.
    pub fn search_batch(&self, min_weight_magnitude: usize, offset: u64) -> Option<u64> {
        let mut nonce = self.nonce;
        ternary::add(&mut nonce, offset);

        let mut curl = BitslicedCurl::from_words(self.mid_state);
        for lane in 0..self.lanes {
            curl.load_lane(lane, &nonce);
            ternary::increment(&mut nonce);
        }
        curl.transform();

        curl.load_broadcast(&self.trunk);
        curl.transform();

        curl.load_broadcast(&self.branch);
        curl.transform();

        curl.first_zero_tail(min_weight_magnitude, self.lanes)
            .map(|lane| offset + lane as u64)
    }

    /// Single-threaded search from offset 0.
    pub fn search(&self, min_weight_magnitude: usize) -> Result<u64> {
        self.search_with_cancel(min_weight_magnitude, 1, &AtomicBool::new(false))
    }

    /// Search with `workers` threads over interleaved batches.
    ///
    /// Returns the same offset as [`Miner::search`].
    pub fn search_parallel(&self, min_weight_magnitude: usize, workers: usize) -> Result<u64> {
        self.search_with_cancel(min_weight_magnitude, workers, &AtomicBool::new(false))
    }

    /// Search until a nonce is found or `cancel` is raised.
    ///
    /// Batch `k` (offset `k * lanes`) belongs to worker `k % workers`. The
    /// first worker to succeed publishes its offset; every worker then
    /// stops once its next batch starts past the best offset known, so the
    /// lowest winning offset is always the one returned. A solution found
    /// before cancellation is still returned.
    pub fn search_with_cancel(
        &self,
        min_weight_magnitude: usize,
        workers: usize,
        cancel: &AtomicBool,
    ) -> Result<u64> {
        self.search_from(min_weight_magnitude, 0, workers, cancel)
    }

    /// Search offsets from `start` upwards.
    ///
    /// Fails with [`PowError::OffsetExhausted`] once the next batch would
    /// run past `u64::MAX`.
    pub fn search_from(
        &self,
        min_weight_magnitude: usize,
        start: u64,
        workers: usize,
        cancel: &AtomicBool,
    ) -> Result<u64> {
        check_min_weight_magnitude(min_weight_magnitude)?;
        check_lanes(self.lanes, W::LANES)?;
        if workers == 0 {
            return Err(PowError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }

        debug!(
            "searching: minWeightMagnitude={} lanes={} workers={} start={}",
            min_weight_magnitude, self.lanes, workers, start
        );

        let best = AtomicU64::new(NOT_FOUND);
        let outcomes = self.run_workers(min_weight_magnitude, start, workers, &best, cancel)?;

        match best.into_inner() {
            NOT_FOUND => Err(outcomes
                .into_iter()
                .find_map(|outcome| outcome.err())
                .unwrap_or(PowError::OffsetExhausted)),
            offset => {
                info!("nonce found at offset {}", offset);
                Ok(offset)
            }
        }
    }

    #[cfg(feature = "parallel")]
    fn run_workers(
        &self,
        min_weight_magnitude: usize,
        start: u64,
        workers: usize,
        best: &AtomicU64,
        cancel: &AtomicBool,
    ) -> Result<Vec<Result<()>>> {
        if workers == 1 {
            return Ok(vec![self.run_worker(
                min_weight_magnitude,
                start,
                0,
                1,
                best,
                cancel,
            )]);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| PowError::InvalidConfig(e.to_string()))?;

        Ok(pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|worker| {
                    self.run_worker(min_weight_magnitude, start, worker, workers, best, cancel)
                })
                .collect()
        }))
    }

    /// Sequential fallback: one worker visits every batch in order, which
    /// yields the same lowest offset.
    #[cfg(not(feature = "parallel"))]
    fn run_workers(
        &self,
        min_weight_magnitude: usize,
        start: u64,
        _workers: usize,
        best: &AtomicU64,
        cancel: &AtomicBool,
    ) -> Result<Vec<Result<()>>> {
        Ok(vec![self.run_worker(
            min_weight_magnitude,
            start,
            0,
            1,
            best,
            cancel,
        )])
    }

    fn run_worker(
        &self,
        min_weight_magnitude: usize,
        start: u64,
        worker: usize,
        workers: usize,
        best: &AtomicU64,
        cancel: &AtomicBool,
    ) -> Result<()> {
        let lanes = self.lanes as u64;
        let stride = lanes
            .checked_mul(workers as u64)
            .ok_or(PowError::OffsetExhausted)?;
        let mut offset = lanes
            .checked_mul(worker as u64)
            .and_then(|skip| start.checked_add(skip))
            .ok_or(PowError::OffsetExhausted)?;
        let mut batches: u64 = 0;

        loop {
            if offset >= best.load(Ordering::Acquire) {
                return Ok(());
            }
            if cancel.load(Ordering::Relaxed) {
                return Err(PowError::Cancelled);
            }
            if offset.checked_add(lanes).is_none() {
                return Err(PowError::OffsetExhausted);
            }

            trace!("worker {} batch at offset {}", worker, offset);
            batches += 1;

            if let Some(found) = self.search_batch(min_weight_magnitude, offset) {
                best.fetch_min(found, Ordering::AcqRel);
                debug!(
                    "worker {} hit offset {} after {} batches",
                    worker, found, batches
                );
                return Ok(());
            }

            offset = offset
                .checked_add(stride)
                .ok_or(PowError::OffsetExhausted)?;
        }
    }

    /// The transaction with its nonce advanced by `offset`.
    pub fn finalize(&self, offset: u64) -> Transaction {
        let mut nonce = self.nonce;
        ternary::add(&mut nonce, offset);
        self.transaction.with_nonce_trits(&nonce)
    }
}

/// Mine `transaction` on one thread with 32 lanes.
///
/// # Example
///
/// ```rust
/// use curl_core::{Transaction, proof_of_work};
///
/// let tx = Transaction::from_trytes(&"9".repeat(2673)).unwrap();
/// let mined = proof_of_work(&tx, 1).unwrap();
/// assert!(mined.verify(1));
/// ```
pub fn proof_of_work(
    transaction: &Transaction,
    min_weight_magnitude: usize,
) -> Result<Transaction> {
    proof_of_work_with(transaction, &PowConfig::new(min_weight_magnitude))
}

/// Mine `transaction` with an explicit configuration.
pub fn proof_of_work_with(transaction: &Transaction, config: &PowConfig) -> Result<Transaction> {
    config.validate(<u64 as Lanes>::LANES)?;

    let miner = Miner::<u64>::new(transaction).with_lanes(config.lanes)?;
    let offset = miner.search_parallel(config.min_weight_magnitude, config.threads)?;
    Ok(miner.finalize(offset))
}

/// Check if a digest meets the required difficulty
///
/// Difficulty is the number of trailing trits that must be zero.
///
/// # Example
///
/// ```rust
/// use curl_core::meets_difficulty;
///
/// let mut hash = [1i8; 243];
/// hash[241] = 0;
/// hash[242] = 0;
/// assert!(meets_difficulty(&hash, 2));
/// assert!(!meets_difficulty(&hash, 3));
/// ```
#[inline]
pub fn meets_difficulty(hash: &[Trit], min_weight_magnitude: usize) -> bool {
    min_weight_magnitude <= hash.len()
        && hash[hash.len() - min_weight_magnitude..]
            .iter()
            .all(|&trit| trit == 0)
}
