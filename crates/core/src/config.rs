//! Proof-of-work search configuration

use serde::{Deserialize, Serialize};

use crate::error::{PowError, Result};
use crate::params::{DEFAULT_LANES, DEFAULT_MIN_WEIGHT_MAGNITUDE, HASH_LENGTH};

/// Knobs of one mining session
///
/// Word width is fixed by the miner's type parameter; `lanes` picks how
/// many of that word's lanes carry a nonce candidate per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowConfig {
    /// Trailing zero trits required in the digest
    pub min_weight_magnitude: usize,
    /// Worker threads racing over interleaved offset batches
    pub threads: usize,
    /// Nonce candidates per batch
    pub lanes: usize,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            min_weight_magnitude: DEFAULT_MIN_WEIGHT_MAGNITUDE,
            threads: 1,
            lanes: DEFAULT_LANES,
        }
    }
}

impl PowConfig {
    /// Default configuration at the given difficulty.
    pub fn new(min_weight_magnitude: usize) -> Self {
        Self {
            min_weight_magnitude,
            ..Self::default()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    /// Check the configuration against a word holding `max_lanes` lanes.
    pub fn validate(&self, max_lanes: usize) -> Result<()> {
        check_min_weight_magnitude(self.min_weight_magnitude)?;
        check_lanes(self.lanes, max_lanes)?;
        if self.threads == 0 {
            return Err(PowError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_min_weight_magnitude(min_weight_magnitude: usize) -> Result<()> {
    if (1..=HASH_LENGTH).contains(&min_weight_magnitude) {
        Ok(())
    } else {
        Err(PowError::InvalidMinWeightMagnitude(min_weight_magnitude))
    }
}

pub(crate) fn check_lanes(lanes: usize, max_lanes: usize) -> Result<()> {
    if (1..=max_lanes).contains(&lanes) {
        Ok(())
    } else {
        Err(PowError::InvalidConfig(format!(
            "lanes must be between 1 and {}, got {}",
            max_lanes, lanes
        )))
    }
}
