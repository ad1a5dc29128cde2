//! Saturation event counting
//!
//! Clamping a section output to 32 bits is designed behaviour, not an
//! error, but it usually means the filter is unstable or the gain is too
//! high for the input. The monitor keeps the events countable for tests
//! and diagnostics without interrupting processing.

use crate::q30::saturate32;
use tracing::trace;

/// Direction of a clamp event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    /// Value exceeded `i32::MAX`
    Positive,
    /// Value fell below `i32::MIN`
    Negative,
}

/// Counts saturation events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaturationMonitor {
    positive: u64,
    negative: u64,
    last: Option<Clamp>,
}

impl SaturationMonitor {
    /// Create a monitor with no recorded events
    pub fn new() -> Self {
        Self::default()
    }

    /// Saturate `acc` to 32 bits, recording a clamp if one happens
    #[inline]
    pub fn saturate(&mut self, acc: i64) -> i64 {
        let (value, clamped) = saturate32(acc);
        if clamped {
            let direction = if acc > value {
                Clamp::Positive
            } else {
                Clamp::Negative
            };
            self.record(direction);
            trace!(acc, value, ?direction, "Section output saturated");
        }
        value
    }

    fn record(&mut self, direction: Clamp) {
        match direction {
            Clamp::Positive => self.positive += 1,
            Clamp::Negative => self.negative += 1,
        }
        self.last = Some(direction);
    }

    /// Total clamp events
    pub fn events(&self) -> u64 {
        self.positive + self.negative
    }

    /// Clamps at the upper limit
    pub fn positive(&self) -> u64 {
        self.positive
    }

    /// Clamps at the lower limit
    pub fn negative(&self) -> u64 {
        self.negative
    }

    /// Direction of the most recent clamp
    pub fn last(&self) -> Option<Clamp> {
        self.last
    }

    /// True if anything was clamped since the last reset
    pub fn saturated(&self) -> bool {
        self.events() > 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
