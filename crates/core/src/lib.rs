//! # Curl-P-27 Core Algorithm
//!
//! The balanced-ternary sponge hash Curl-P-27 and a bit-sliced
//! proof-of-work search over it.
//!
//! ## Features
//!
//! - **Ternary codec**: trytes `9A-Z` ↔ trits, balanced-ternary add/increment
//! - **Scalar Curl**: 729-trit state, 27 rounds, 81-tryte digests
//! - **Bit-sliced Curl**: the same permutation on many states at once,
//!   two bits per trit inside `u32`/`u64`/`u128` or any multiple of 64 bits
//! - **Nonce search**: finds a nonce whose transaction digest ends in
//!   `min_weight_magnitude` zero trits, on one thread or many
//!
//! ## Algorithm Parameters
//!
//! - 729-trit state, 243-trit rate/digest
//! - 27 rounds per permutation
//! - 2,673-tryte transactions: header 2,430, then nonce, trunk and branch
//!   of 81 trytes each
//!
//! ## Example
//!
//! ```rust
//! use curl_core::{Transaction, hash, meets_difficulty, proof_of_work};
//!
//! // Single-shot hashing
//! let digest = hash("HELLOWORLD").unwrap();
//! assert_eq!(digest.len(), 81);
//!
//! // Mine a transaction (one trailing zero trit)
//! let tx = Transaction::from_trytes(&"A".repeat(2673)).unwrap();
//! let mined = proof_of_work(&tx, 1).unwrap();
//! assert!(meets_difficulty(&mined.hash_trits(), 1));
//! ```

pub mod bitslice;
mod config;
pub mod curl;
mod error;
mod params;
pub mod pow;
mod sponge;
pub mod ternary;
mod transaction;

pub use bitslice::{BitslicedCurl, Lanes, Wide};
pub use config::PowConfig;
pub use curl::{Curl, hash};
pub use error::{PowError, Result};
pub use params::*;
pub use pow::{Miner, meets_difficulty, proof_of_work, proof_of_work_with};
pub use sponge::Sponge;
pub use ternary::{Trit, trits_to_trytes, trytes_to_trits};
pub use transaction::Transaction;

#[cfg(test)]
mod tests;
