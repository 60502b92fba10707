//! Pulse counts.

use core::fmt;
use core::ops::AddAssign;

/// Number of clock pulses a CPU has received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Saturates at `u64::MAX`.
impl AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_and_saturate() {
        let mut ticks = Ticks::ZERO;
        ticks += Ticks::new(2);
        ticks += Ticks::new(3);
        assert_eq!(ticks.get(), 5);

        let mut full = Ticks::new(u64::MAX - 1);
        full += Ticks::new(4);
        assert_eq!(full, Ticks::new(u64::MAX));
    }
}
