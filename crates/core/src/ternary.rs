//! Tryte/trit codec and balanced-ternary counters
//!
//! A tryte is one of the 27 symbols `9A-Z`; each maps to three trits,
//! least significant first. Symbol `9` is the zero tryte and `A..Z`
//! follow in table order, so the value of a tryte is its alphabet index
//! with indices above 13 wrapped to negative values.

use crate::error::{PowError, Result};
use crate::params::TRITS_PER_TRYTE;

/// A balanced ternary digit: -1, 0 or 1.
pub type Trit = i8;

/// Tryte symbols in value order
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Trit triple of every tryte, indexed like [`TRYTE_ALPHABET`]
pub const TRYTE_TO_TRITS: [[Trit; 3]; 27] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
    [-1, -1, -1],
    [0, -1, -1],
    [1, -1, -1],
    [-1, 0, -1],
    [0, 0, -1],
    [1, 0, -1],
    [-1, 1, -1],
    [0, 1, -1],
    [1, 1, -1],
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [-1, 0, 0],
];

/// Position of a symbol in [`TRYTE_ALPHABET`]
#[inline]
pub fn tryte_index(symbol: u8) -> Option<usize> {
    match symbol {
        b'9' => Some(0),
        b'A'..=b'Z' => Some((symbol - b'A') as usize + 1),
        _ => None,
    }
}

/// Returns true if `symbol` is one of `9A-Z`.
#[inline]
pub fn is_tryte(symbol: u8) -> bool {
    tryte_index(symbol).is_some()
}

/// Check that every symbol of `trytes` is in the alphabet.
pub fn validate_trytes(trytes: &[u8]) -> Result<()> {
    match trytes.iter().position(|&symbol| !is_tryte(symbol)) {
        Some(position) => Err(invalid_tryte(trytes, position)),
        None => Ok(()),
    }
}

fn invalid_tryte(trytes: &[u8], position: usize) -> PowError {
    PowError::InvalidTryte {
        position,
        symbol: trytes[position] as char,
    }
}

/// Convert trytes into trits.
///
/// Writes `3 * trytes.len()` trits at the start of `trits`, which must be
/// at least that long.
pub fn trytes_to_trits(trytes: &[u8], trits: &mut [Trit]) -> Result<()> {
    debug_assert!(trits.len() >= trytes.len() * TRITS_PER_TRYTE);

    for (position, (&symbol, out)) in trytes
        .iter()
        .zip(trits.chunks_exact_mut(TRITS_PER_TRYTE))
        .enumerate()
    {
        let index = tryte_index(symbol).ok_or_else(|| invalid_tryte(trytes, position))?;
        out.copy_from_slice(&TRYTE_TO_TRITS[index]);
    }

    Ok(())
}

/// Convert trits into trytes.
///
/// Produces `ceil(trits.len() / 3)` symbols; a short final group is
/// padded with zero trits.
pub fn trits_to_trytes(trits: &[Trit]) -> String {
    trits
        .chunks(TRITS_PER_TRYTE)
        .map(|group| {
            let value = group.iter().rev().fold(0i8, |acc, &trit| acc * 3 + trit);
            let index = if value < 0 { value + 27 } else { value };
            TRYTE_ALPHABET[index as usize] as char
        })
        .collect()
}

/// Add `n` to the balanced-ternary number stored least significant
/// trit first in `trits`.
///
/// Returns the carry that did not fit. Digits past the end of the slice
/// are dropped.
pub fn add(trits: &mut [Trit], mut n: u64) -> u64 {
    for trit in trits.iter_mut() {
        *trit += (n % 3) as Trit;
        n /= 3;
        if *trit > 1 {
            *trit -= 3;
            n += 1;
        }
    }
    n
}

/// Add one to the balanced-ternary number in `trits`.
///
/// A digit rolling over from 1 becomes -1 and carries into the next one;
/// a carry out of the last digit is dropped.
#[inline]
pub fn increment(trits: &mut [Trit]) {
    for trit in trits.iter_mut() {
        *trit += 1;
        if *trit > 1 {
            *trit = -1;
        } else {
            return;
        }
    }
}
