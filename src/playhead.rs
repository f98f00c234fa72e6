//! High-precision elapsed-time accumulator.
//!
//! A [`Playhead`] splits elapsed time into an integer number of seconds and a
//! fractional part kept in `[0, 1)`. Deltas are only ever added to the
//! fraction; whenever it leaves `[0, 1)` the overflow is carried into (or
//! borrowed from) the whole part with `floor`. The whole part therefore never
//! carries rounding error, and the sum `whole + fraction` is only formed when
//! a caller asks for it.
//!
//! This keeps per-frame accumulation accurate for hundreds of billions of
//! simulated seconds, where a plain `f64` sum would already have lost the
//! millisecond digits.
//!
//! Playheads accumulate signed time: reversed actions call
//! [`advance`](Playhead::advance) with `reversed = true` and the playhead
//! walks backwards, possibly below zero.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Playhead {
    whole: i64,
    fraction: f64,
}

impl Playhead {
    pub const ZERO: Playhead = Playhead {
        whole: 0,
        fraction: 0.0,
    };

    pub fn new() -> Self {
        Self::ZERO
    }

    /// Build a playhead holding `seconds` (may be negative).
    pub fn from_seconds(seconds: f64) -> Self {
        let whole = seconds.floor();
        let mut p = Playhead {
            whole: whole as i64,
            fraction: seconds - whole,
        };
        p.normalize();
        p
    }

    /// Build a playhead from an explicit split. `fraction` is renormalised.
    pub fn from_precise(whole: i64, fraction: f64) -> Self {
        let mut p = Playhead::ZERO;
        p.set_precise(whole, fraction);
        p
    }

    pub fn set_precise(&mut self, whole: i64, fraction: f64) {
        self.whole = whole;
        self.fraction = fraction;
        self.normalize();
    }

    pub fn reset(&mut self) {
        *self = Self::ZERO;
    }

    /// Add `delta` seconds (subtract when `reversed`) and return the new
    /// elapsed time.
    pub fn advance(&mut self, delta: f64, reversed: bool) -> f64 {
        debug_assert!(delta.is_finite(), "Playhead::advance with non-finite delta");
        self.fraction += if reversed { -delta } else { delta };
        self.normalize();
        self.elapsed()
    }

    /// Elapsed seconds as a single float.
    pub fn elapsed(&self) -> f64 {
        self.whole as f64 + self.fraction
    }

    pub fn whole(&self) -> i64 {
        self.whole
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// `self - origin` in seconds, subtracting whole and fractional parts
    /// separately before combining them.
    pub fn seconds_since(&self, origin: &Playhead) -> f64 {
        (self.whole - origin.whole) as f64 + (self.fraction - origin.fraction)
    }

    pub fn is_zero(&self) -> bool {
        self.whole == 0 && self.fraction == 0.0
    }

    fn normalize(&mut self) {
        if (0.0..1.0).contains(&self.fraction) {
            return;
        }
        let carry = self.fraction.floor();
        self.whole += carry as i64;
        self.fraction -= carry;
        // `x - floor(x)` can round up to exactly 1.0 for tiny negative x.
        if self.fraction >= 1.0 {
            self.whole += 1;
            self.fraction = 0.0;
        } else if self.fraction < 0.0 {
            self.fraction = 0.0;
        }
    }
}

impl PartialOrd for Playhead {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.whole.cmp(&other.whole) {
            Ordering::Equal => self.fraction.partial_cmp(&other.fraction),
            ord => Some(ord),
        }
    }
}
