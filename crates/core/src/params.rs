//! Curl-P-27 and transaction layout parameters
//!
//! All sizes are in trits unless the name says trytes.

/// Number of trits in a Curl digest
pub const HASH_LENGTH: usize = 243;

/// Number of trits in the sponge state (3 × digest)
pub const STATE_LENGTH: usize = 3 * HASH_LENGTH;

/// Rounds applied by one permutation
pub const NUMBER_OF_ROUNDS: usize = 27;

/// Trits per tryte
pub const TRITS_PER_TRYTE: usize = 3;

/// Number of trytes in a Curl digest
pub const HASH_TRYTES: usize = HASH_LENGTH / TRITS_PER_TRYTE;

/// Number of trytes in a serialized transaction
pub const TRANSACTION_TRYTES: usize = 2673;

/// Header region absorbed into the mid-state
pub const HEADER_OFFSET: usize = 0;
pub const HEADER_TRYTES: usize = 2430;

/// Nonce region searched by the miner
pub const NONCE_OFFSET: usize = HEADER_OFFSET + HEADER_TRYTES;
pub const NONCE_TRYTES: usize = HASH_TRYTES;

/// Trunk transaction reference
pub const TRUNK_OFFSET: usize = NONCE_OFFSET + NONCE_TRYTES;
pub const TRUNK_TRYTES: usize = HASH_TRYTES;

/// Branch transaction reference
pub const BRANCH_OFFSET: usize = TRUNK_OFFSET + TRUNK_TRYTES;
pub const BRANCH_TRYTES: usize = HASH_TRYTES;

/// Difficulty used when the caller does not supply one
pub const DEFAULT_MIN_WEIGHT_MAGNITUDE: usize = 13;

/// Nonce candidates per batch on the native 64-bit path
pub const DEFAULT_LANES: usize = 32;
