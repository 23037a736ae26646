//! Error types for hashing and proof-of-work operations

/// Errors reported at the boundary of the core.
///
/// The transforms and the search loop never fail; everything here is
/// detected while validating input or configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PowError {
    /// Input does not have the required number of trytes.
    #[error("invalid length: expected {expected} trytes, got {actual}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// A symbol outside `9A-Z`.
    #[error("invalid tryte {symbol:?} at position {position} (expected one of [9A-Z])")]
    InvalidTryte {
        /// Index of the offending symbol.
        position: usize,
        /// The offending symbol.
        symbol: char,
    },

    /// Difficulty outside `1..=HASH_LENGTH`.
    #[error("minWeightMagnitude ({0}) should be between 1 and 243")]
    InvalidMinWeightMagnitude(usize),

    /// Inconsistent search configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The 64-bit search offset ran out before a nonce was found.
    #[error("nonce search space exhausted")]
    OffsetExhausted,

    /// The caller raised the cancellation flag.
    #[error("search cancelled")]
    Cancelled,
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, PowError>;
