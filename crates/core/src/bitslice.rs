//! Bit-sliced Curl-P-27
//!
//! Packs many independent Curl states into the bits of wider words. Each
//! trit takes two adjacent bits (a lane):
//!
//! ```text
//! -1 -> 0b11    0 -> 0b01    1 -> 0b10    (0b00 is never produced)
//! ```
//!
//! A state is 729 such words, so a `u64` state runs 32 sponges at once.
//! The substitution `T(x, y)` becomes a handful of shifts and masks that
//! act on every lane of a word simultaneously:
//!
//! ```text
//! c    = ((x ^ (x >> 1)) & LOW) | ((x << 1) & HIGH)
//! T    = c ^ (HIGH & y & ((y & c) << 1)) ^ (LOW & !y & ((y & c) >> 1))
//! ```
//!
//! The shifts only ever move a bit inside its own lane once masked, so
//! lanes never interact.

use core::fmt::Debug;
use core::ops::{BitAnd, BitOr, BitXor, Not};

use crate::params::{HASH_LENGTH, STATE_LENGTH};
use crate::sponge::{Sponge, permute};
use crate::ternary::Trit;

/// Lane code of the trit 0
pub const ZERO_CODE: u8 = 0b01;

/// Two-bit lane code of a trit.
#[inline(always)]
pub const fn encode(trit: Trit) -> u8 {
    match trit {
        -1 => 0b11,
        0 => 0b01,
        _ => 0b10,
    }
}

/// Trit of a two-bit lane code; `0b00` has none.
#[inline(always)]
pub const fn decode(code: u8) -> Option<Trit> {
    match code & 0b11 {
        0b11 => Some(-1),
        0b01 => Some(0),
        0b10 => Some(1),
        _ => None,
    }
}

/// A word whose bits are split into two-bit trit lanes.
pub trait Lanes:
    Copy
    + Eq
    + Debug
    + Send
    + Sync
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + 'static
{
    /// Number of lanes (half the bit width)
    const LANES: usize;
    /// No bits set
    const ZERO: Self;
    /// Low bit of every lane (`0101…`), also the broadcast of trit 0
    const LOW: Self;
    /// High bit of every lane (`1010…`), also the broadcast of trit 1
    const HIGH: Self;
    /// Every bit set, also the broadcast of trit -1
    const ALL: Self;

    /// Shift every bit one position towards the most significant end.
    fn shl1(self) -> Self;

    /// Shift every bit one position towards the least significant end.
    fn shr1(self) -> Self;

    /// The two-bit code held by `lane`.
    fn pair(self, lane: usize) -> u8;

    /// Replace the two-bit code held by `lane`.
    fn with_pair(self, lane: usize, code: u8) -> Self;

    /// A word with `trit` in every lane.
    #[inline(always)]
    fn broadcast(trit: Trit) -> Self {
        match trit {
            -1 => Self::ALL,
            0 => Self::LOW,
            _ => Self::HIGH,
        }
    }
}

macro_rules! impl_lanes {
    ($($word:ty),* $(,)?) => {$(
        impl Lanes for $word {
            const LANES: usize = <$word>::BITS as usize / 2;
            const ZERO: Self = 0;
            const LOW: Self = <$word>::MAX / 3;
            const HIGH: Self = Self::LOW << 1;
            const ALL: Self = <$word>::MAX;

            #[inline(always)]
            fn shl1(self) -> Self {
                self << 1
            }

            #[inline(always)]
            fn shr1(self) -> Self {
                self >> 1
            }

            #[inline(always)]
            fn pair(self, lane: usize) -> u8 {
                ((self >> (2 * lane)) & 0b11) as u8
            }

            #[inline(always)]
            fn with_pair(self, lane: usize, code: u8) -> Self {
                let shift = 2 * lane;
                (self & !((0b11 as $word) << shift)) | (((code & 0b11) as $word) << shift)
            }
        }
    )*};
}

impl_lanes!(u32, u64, u128);

/// A lane word of `LIMBS` × 64 bits.
///
/// Width is a compile-time parameter, so the same transform runs 32, 64,
/// 128 or more lanes. Limbs are little-endian: lane 0 lives in the low
/// bits of limb 0.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Wide<const LIMBS: usize>(pub [u64; LIMBS]);

impl<const LIMBS: usize> BitAnd for Wide<LIMBS> {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Wide(core::array::from_fn(|i| self.0[i] & rhs.0[i]))
    }
}

impl<const LIMBS: usize> BitOr for Wide<LIMBS> {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Wide(core::array::from_fn(|i| self.0[i] | rhs.0[i]))
    }
}

impl<const LIMBS: usize> BitXor for Wide<LIMBS> {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Wide(core::array::from_fn(|i| self.0[i] ^ rhs.0[i]))
    }
}

impl<const LIMBS: usize> Not for Wide<LIMBS> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Wide(self.0.map(|limb| !limb))
    }
}

impl<const LIMBS: usize> Lanes for Wide<LIMBS> {
    const LANES: usize = 32 * LIMBS;
    const ZERO: Self = Wide([0; LIMBS]);
    const LOW: Self = Wide([<u64 as Lanes>::LOW; LIMBS]);
    const HIGH: Self = Wide([<u64 as Lanes>::HIGH; LIMBS]);
    const ALL: Self = Wide([u64::MAX; LIMBS]);

    #[inline(always)]
    fn shl1(self) -> Self {
        let mut out = [0u64; LIMBS];
        let mut carry = 0;
        for (dst, &limb) in out.iter_mut().zip(&self.0) {
            *dst = (limb << 1) | carry;
            carry = limb >> 63;
        }
        Wide(out)
    }

    #[inline(always)]
    fn shr1(self) -> Self {
        let mut out = [0u64; LIMBS];
        let mut carry = 0;
        for (dst, &limb) in out.iter_mut().zip(&self.0).rev() {
            *dst = (limb >> 1) | carry;
            carry = limb << 63;
        }
        Wide(out)
    }

    #[inline(always)]
    fn pair(self, lane: usize) -> u8 {
        self.0[lane / 32].pair(lane % 32)
    }

    #[inline(always)]
    fn with_pair(mut self, lane: usize, code: u8) -> Self {
        let limb = &mut self.0[lane / 32];
        *limb = limb.with_pair(lane % 32, code);
        self
    }
}

/// Lane-wise first half of the substitution (`c`).
#[inline(always)]
pub fn complement<W: Lanes>(a: W) -> W {
    ((a ^ a.shr1()) & W::LOW) | (a.shl1() & W::HIGH)
}

/// Lane-wise second half of the substitution (`d`).
#[inline(always)]
pub fn mix<W: Lanes>(b: W, c: W) -> W {
    let both = b & c;
    c ^ (W::HIGH & b & both.shl1()) ^ (W::LOW & !b & both.shr1())
}

/// `T(x, y)` on every lane at once.
#[inline(always)]
pub fn lane_truth<W: Lanes>(x: W, y: W) -> W {
    mix(y, complement(x))
}

/// Curl-P-27 over lane words
///
/// Every lane is an independent sponge. A lane holding the code `0b00`
/// yields undefined trits in that lane only.
#[derive(Clone)]
pub struct BitslicedCurl<W: Lanes> {
    buffers: [[W; STATE_LENGTH]; 2],
}

impl<W: Lanes> BitslicedCurl<W> {
    /// All lanes at the zero state.
    pub fn new() -> Self {
        Self::from_words([W::LOW; STATE_LENGTH])
    }

    /// Start from raw lane words.
    pub fn from_words(state: [W; STATE_LENGTH]) -> Self {
        Self {
            buffers: [state, [W::ZERO; STATE_LENGTH]],
        }
    }

    /// Every lane set to the same scalar state.
    pub fn from_trits(state: &[Trit; STATE_LENGTH]) -> Self {
        Self::from_words(state.map(W::broadcast))
    }

    /// The lane words of the state.
    pub fn words(&self) -> &[W; STATE_LENGTH] {
        &self.buffers[0]
    }

    /// Apply the 27-round permutation to every lane.
    pub fn transform(&mut self) {
        permute(&mut self.buffers, lane_truth);
    }

    /// Overwrite the start of the state with `trits` in every lane.
    pub fn load_broadcast(&mut self, trits: &[Trit]) {
        for (word, &trit) in self.buffers[0].iter_mut().zip(trits) {
            *word = W::broadcast(trit);
        }
    }

    /// Overwrite the start of one lane's state with `trits`.
    pub fn load_lane(&mut self, lane: usize, trits: &[Trit]) {
        for (word, &trit) in self.buffers[0].iter_mut().zip(trits) {
            *word = word.with_pair(lane, encode(trit));
        }
    }

    /// Trit at `index` of one lane, `None` if the lane holds `0b00` there.
    pub fn lane_trit(&self, lane: usize, index: usize) -> Option<Trit> {
        decode(self.buffers[0][index].pair(lane))
    }

    /// The full scalar state of one lane.
    pub fn lane_state(&self, lane: usize) -> Option<[Trit; STATE_LENGTH]> {
        let mut out = [0; STATE_LENGTH];
        for (trit, word) in out.iter_mut().zip(&self.buffers[0]) {
            *trit = decode(word.pair(lane))?;
        }
        Some(out)
    }

    /// The 243-trit digest of one lane.
    pub fn lane_digest(&self, lane: usize) -> Option<[Trit; HASH_LENGTH]> {
        let mut out = [0; HASH_LENGTH];
        for (trit, word) in out.iter_mut().zip(&self.buffers[0]) {
            *trit = decode(word.pair(lane))?;
        }
        Some(out)
    }

    /// Lowest lane among the first `lanes` whose digest ends in
    /// `min_weight_magnitude` zero trits.
    ///
    /// # Panics
    ///
    /// Panics if `min_weight_magnitude` exceeds the digest length.
    #[inline]
    pub fn first_zero_tail(&self, min_weight_magnitude: usize, lanes: usize) -> Option<usize> {
        let tail = &self.buffers[0][HASH_LENGTH - min_weight_magnitude..HASH_LENGTH];

        // Low bit of a lane survives only while every tail trit codes 0b01
        let mut zeros = W::LOW;
        for &word in tail {
            zeros = zeros & word & !word.shr1();
        }

        (0..lanes).find(|&lane| zeros.pair(lane) == ZERO_CODE)
    }
}

impl<W: Lanes> Default for BitslicedCurl<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Lanes> Sponge for BitslicedCurl<W> {
    type Item = W;

    fn absorb(&mut self, words: &[W]) {
        for chunk in words.chunks(HASH_LENGTH) {
            self.buffers[0][..chunk.len()].copy_from_slice(chunk);
            self.transform();
        }
    }

    fn squeeze(&mut self, out: &mut [W]) {
        for chunk in out.chunks_mut(HASH_LENGTH) {
            chunk.copy_from_slice(&self.buffers[0][..chunk.len()]);
            self.transform();
        }
    }

    fn reset(&mut self) {
        self.buffers = [[W::LOW; STATE_LENGTH], [W::ZERO; STATE_LENGTH]];
    }
}
