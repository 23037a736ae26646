//! Sponge interface and the Curl-P round schedule
//!
//! Both the scalar and the bit-sliced Curl walk the state in the same
//! order; only the cell type and the substitution differ.

use crate::params::{NUMBER_OF_ROUNDS, STATE_LENGTH};

/// A sponge construction over some cell type.
pub trait Sponge {
    type Item;

    /// Absorb `input` in rate-sized chunks, permuting after each chunk.
    fn absorb(&mut self, input: &[Self::Item]);

    /// Copy rate-sized chunks of the state into `out`, permuting after each.
    fn squeeze(&mut self, out: &mut [Self::Item]);

    /// Return to the all-zero state.
    fn reset(&mut self);
}

/// Middle of the state; the two read cursors start here and at the end
const HALF: usize = STATE_LENGTH / 2;

/// Apply the full Curl-P permutation to `buffers[0]`.
///
/// Round `r` reads `buffers[r % 2]` and writes `buffers[(r + 1) % 2]`, so
/// no round reads its own output. `buffers[1]` is scratch on entry and
/// exit.
#[inline(always)]
pub(crate) fn permute<T, F>(buffers: &mut [[T; STATE_LENGTH]; 2], f: F)
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    let [first, second] = buffers;

    for round in 0..NUMBER_OF_ROUNDS {
        let (src, dst) = if round % 2 == 0 {
            (&*first, &mut *second)
        } else {
            (&*second, &mut *first)
        };

        dst[0] = f(src[0], src[HALF]);
        for i in 0..HALF {
            dst[2 * i + 1] = f(src[HALF - i], src[STATE_LENGTH - 1 - i]);
            dst[2 * i + 2] = f(src[STATE_LENGTH - 1 - i], src[HALF - 1 - i]);
        }
    }

    // An odd round count leaves the result in the second buffer
    if NUMBER_OF_ROUNDS % 2 == 1 {
        *first = *second;
    }
}
