//! Scalar Curl-P-27
//!
//! The reference sponge: a 729-trit state whose first 243 trits are the
//! rate. Input is absorbed 243 trits (81 trytes) at a time by overwriting
//! the rate and permuting; the digest is the rate after the last absorb.

use crate::error::Result;
use crate::params::{HASH_LENGTH, HASH_TRYTES, STATE_LENGTH, TRITS_PER_TRYTE};
use crate::sponge::{Sponge, permute};
use crate::ternary::{Trit, trits_to_trytes, trytes_to_trits, validate_trytes};

/// Substitution table indexed by `x + 4y + 5`
pub const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 0, 1, -1, 0, 0, -1, 1, 0];

/// The Curl substitution `T(x, y)`.
#[inline(always)]
pub fn truth(x: Trit, y: Trit) -> Trit {
    TRUTH_TABLE[(x + 4 * y + 5) as usize]
}

/// Curl-P-27 sponge over plain trits
///
/// The state lives in `buffers[0]`; `buffers[1]` is the round scratch.
#[derive(Clone)]
pub struct Curl {
    buffers: [[Trit; STATE_LENGTH]; 2],
}

impl Curl {
    /// Create a sponge with an all-zero state.
    pub fn new() -> Self {
        Self {
            buffers: [[0; STATE_LENGTH]; 2],
        }
    }

    /// Create a sponge starting from an arbitrary state.
    pub fn from_state(state: [Trit; STATE_LENGTH]) -> Self {
        Self {
            buffers: [state, [0; STATE_LENGTH]],
        }
    }

    /// The full 729-trit state.
    pub fn state(&self) -> &[Trit; STATE_LENGTH] {
        &self.buffers[0]
    }

    /// Apply the 27-round permutation.
    pub fn transform(&mut self) {
        permute(&mut self.buffers, truth);
    }

    /// Absorb tryte symbols, 81 per permutation.
    ///
    /// A final chunk shorter than 81 trytes overwrites only its own prefix
    /// of the rate. The whole input is validated before the state is touched.
    pub fn absorb_trytes(&mut self, trytes: &[u8]) -> Result<()> {
        validate_trytes(trytes)?;

        for chunk in trytes.chunks(HASH_TRYTES) {
            let rate = &mut self.buffers[0][..chunk.len() * TRITS_PER_TRYTE];
            trytes_to_trits(chunk, rate)?;
            self.transform();
        }

        Ok(())
    }

    /// The digest as 81 trytes, without permuting.
    pub fn finalize(&self) -> String {
        trits_to_trytes(&self.buffers[0][..HASH_LENGTH])
    }

    /// The digest as 243 trits, without permuting.
    pub fn digest(&self) -> [Trit; HASH_LENGTH] {
        let mut out = [0; HASH_LENGTH];
        out.copy_from_slice(&self.buffers[0][..HASH_LENGTH]);
        out
    }
}

impl Default for Curl {
    fn default() -> Self {
        Self::new()
    }
}

impl Sponge for Curl {
    type Item = Trit;

    fn absorb(&mut self, trits: &[Trit]) {
        for chunk in trits.chunks(HASH_LENGTH) {
            self.buffers[0][..chunk.len()].copy_from_slice(chunk);
            self.transform();
        }
    }

    fn squeeze(&mut self, out: &mut [Trit]) {
        for chunk in out.chunks_mut(HASH_LENGTH) {
            chunk.copy_from_slice(&self.buffers[0][..chunk.len()]);
            self.transform();
        }
    }

    fn reset(&mut self) {
        self.buffers = [[0; STATE_LENGTH]; 2];
    }
}

/// Curl-P-27 digest of a tryte string
///
/// Absorbs every symbol from a zero state and returns the 81-tryte digest.
///
/// # Example
///
/// ```rust
/// use curl_core::hash;
///
/// assert_eq!(hash("9".repeat(81).as_str()).unwrap(), "9".repeat(81));
/// ```
pub fn hash(trytes: &str) -> Result<String> {
    let mut curl = Curl::new();
    curl.absorb_trytes(trytes.as_bytes())?;
    Ok(curl.finalize())
}
