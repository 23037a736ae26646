//! Transaction tryte layout
//!
//! ```text
//! | header (2430) | nonce (81) | trunk (81) | branch (81) |
//! ```
//!
//! Offsets and lengths are in trytes. Only the nonce is ever rewritten.

use core::fmt;
use core::ops::Range;
use core::str::FromStr;

use crate::curl::Curl;
use crate::error::{PowError, Result};
use crate::params::*;
use crate::pow::meets_difficulty;
use crate::sponge::Sponge;
use crate::ternary::{Trit, trits_to_trytes, trytes_to_trits, validate_trytes};

const HEADER: Range<usize> = HEADER_OFFSET..HEADER_OFFSET + HEADER_TRYTES;
const NONCE: Range<usize> = NONCE_OFFSET..NONCE_OFFSET + NONCE_TRYTES;
const TRUNK: Range<usize> = TRUNK_OFFSET..TRUNK_OFFSET + TRUNK_TRYTES;
const BRANCH: Range<usize> = BRANCH_OFFSET..BRANCH_OFFSET + BRANCH_TRYTES;

/// Tryte range to the matching trit range
const fn trits_of(range: Range<usize>) -> Range<usize> {
    range.start * TRITS_PER_TRYTE..range.end * TRITS_PER_TRYTE
}

/// A validated 2,673-tryte transaction
///
/// Keeps the tryte string and its trit expansion side by side so the
/// miner and the hasher never re-parse.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    trytes: String,
    trits: Vec<Trit>,
}

impl Transaction {
    /// Parse a transaction, checking its length and alphabet.
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        let bytes = trytes.as_bytes();
        if bytes.len() != TRANSACTION_TRYTES {
            return Err(PowError::InvalidLength {
                expected: TRANSACTION_TRYTES,
                actual: bytes.len(),
            });
        }
        validate_trytes(bytes)?;

        let mut trits = vec![0; TRANSACTION_TRYTES * TRITS_PER_TRYTE];
        trytes_to_trits(bytes, &mut trits)?;

        Ok(Self {
            trytes: trytes.to_owned(),
            trits,
        })
    }

    /// The whole transaction as trytes.
    pub fn as_str(&self) -> &str {
        &self.trytes
    }

    /// The whole transaction as trits.
    pub fn trits(&self) -> &[Trit] {
        &self.trits
    }

    pub fn header(&self) -> &str {
        &self.trytes[HEADER]
    }

    pub fn nonce(&self) -> &str {
        &self.trytes[NONCE]
    }

    pub fn trunk(&self) -> &str {
        &self.trytes[TRUNK]
    }

    pub fn branch(&self) -> &str {
        &self.trytes[BRANCH]
    }

    pub fn header_trits(&self) -> &[Trit] {
        &self.trits[trits_of(HEADER)]
    }

    pub fn nonce_trits(&self) -> &[Trit] {
        &self.trits[trits_of(NONCE)]
    }

    pub fn trunk_trits(&self) -> &[Trit] {
        &self.trits[trits_of(TRUNK)]
    }

    pub fn branch_trits(&self) -> &[Trit] {
        &self.trits[trits_of(BRANCH)]
    }

    /// A copy of this transaction with the nonce field replaced.
    pub fn with_nonce_trits(&self, nonce: &[Trit; HASH_LENGTH]) -> Self {
        let mut out = self.clone();
        out.trytes.replace_range(NONCE, &trits_to_trytes(nonce));
        out.trits[trits_of(NONCE)].copy_from_slice(nonce);
        out
    }

    /// Digest of the whole transaction as 243 trits.
    pub fn hash_trits(&self) -> [Trit; HASH_LENGTH] {
        let mut curl = Curl::new();
        curl.absorb(&self.trits);
        curl.digest()
    }

    /// Digest of the whole transaction as 81 trytes.
    pub fn hash(&self) -> String {
        trits_to_trytes(&self.hash_trits())
    }

    /// Whether the digest ends in `min_weight_magnitude` zero trits.
    pub fn verify(&self, min_weight_magnitude: usize) -> bool {
        meets_difficulty(&self.hash_trits(), min_weight_magnitude)
    }
}

impl FromStr for Transaction {
    type Err = PowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_trytes(s)
    }
}

impl AsRef<str> for Transaction {
    fn as_ref(&self) -> &str {
        &self.trytes
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trytes)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("nonce", &self.nonce())
            .field("trunk", &self.trunk())
            .field("branch", &self.branch())
            .finish_non_exhaustive()
    }
}
