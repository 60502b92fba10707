//! Clock configuration.

use crate::Ticks;

/// Clock that drives a CPU's pulses.
///
/// Hosts use it to convert wall-clock units (frames, seconds) into a pulse
/// budget for the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Pulse frequency in Hz (e.g., `1_789_773` for an NTSC 2A03).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks in `frames` frames at the given frame rate.
    ///
    /// The product saturates, so an absurd frame count yields the largest
    /// budget rather than a wrapped one.
    #[must_use]
    pub const fn ticks_for_frames(&self, frames: u64, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz.saturating_mul(frames) / frames_per_second)
    }
}
