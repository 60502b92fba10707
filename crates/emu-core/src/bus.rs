//! Memory bus interface.

use std::fmt;

/// Size of the full 16-bit address space.
pub const ADDRESS_SPACE: usize = 0x1_0000;

/// A bus access the host cannot satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The address lies beyond the host's backing store.
    OutOfRange {
        /// Address the core computed.
        address: u16,
        /// Number of bytes the host provides.
        size: usize,
    },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { address, size } => write!(
                f,
                "address ${address:04X} is outside the {size}-byte memory image",
            ),
        }
    }
}

impl std::error::Error for BusError {}

/// Memory bus interface.
///
/// The CPU only ever reads and writes through explicit 16-bit addresses.
/// Address wraparound (zero page, 16-bit carry) is the CPU's business; the
/// bus reports anything it cannot back instead of wrapping it.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> Result<u8, BusError>;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError>;
}

impl Bus for [u8] {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        let size = self.len();
        self.get(usize::from(address))
            .copied()
            .ok_or(BusError::OutOfRange { address, size })
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        let size = self.len();
        let cell = self
            .get_mut(usize::from(address))
            .ok_or(BusError::OutOfRange { address, size })?;
        *cell = value;
        Ok(())
    }
}

impl<const N: usize> Bus for [u8; N] {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        self.as_mut_slice().read(address)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        self.as_mut_slice().write(address, value)
    }
}

impl Bus for Vec<u8> {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        self.as_mut_slice().read(address)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        self.as_mut_slice().write(address, value)
    }
}

/// Flat RAM image for hosts and tests.
///
/// Defaults to the full 64 KiB address space. Smaller images (the NES has
/// 2 KiB of internal RAM) report out-of-range accesses as [`BusError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleBus {
    ram: Vec<u8>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    /// Create a zeroed 64 KiB image.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(ADDRESS_SPACE)
    }

    /// Create a zeroed image of `size` bytes, capped at 64 KiB.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            ram: vec![0; size.min(ADDRESS_SPACE)],
        }
    }

    /// Number of addressable bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ram.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ram.is_empty()
    }

    /// Copy `data` into memory starting at `origin`.
    pub fn load(&mut self, origin: u16, data: &[u8]) -> Result<(), BusError> {
        let start = usize::from(origin);
        let end = start + data.len();
        if end > self.ram.len() {
            let last = end - 1;
            return Err(BusError::OutOfRange {
                address: u16::try_from(last).unwrap_or(u16::MAX),
                size: self.ram.len(),
            });
        }
        self.ram[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Read a byte without going through the bus. Out-of-range reads as 0.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram.get(usize::from(address)).copied().unwrap_or(0)
    }

    /// The backing bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.ram
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        self.ram.read(address)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        self.ram.write(address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reports_out_of_range() {
        let mut ram = [0u8; 2048];
        assert_eq!(ram.write(0x07FF, 0x42), Ok(()));
        assert_eq!(ram.read(0x07FF), Ok(0x42));
        assert_eq!(
            ram.read(0x0800),
            Err(BusError::OutOfRange {
                address: 0x0800,
                size: 2048
            })
        );
        assert!(ram.write(0xFFFF, 0).is_err());
    }

    #[test]
    fn simple_bus_load_and_peek() {
        let mut bus = SimpleBus::new();
        assert_eq!(bus.len(), ADDRESS_SPACE);
        bus.load(0x0200, &[0xA9, 0x70, 0x0A]).expect("program fits");
        assert_eq!(bus.peek(0x0201), 0x70);
        assert_eq!(bus.read(0x0202), Ok(0x0A));
    }

    #[test]
    fn simple_bus_load_past_end_fails() {
        let mut bus = SimpleBus::with_size(16);
        let err = bus.load(0x000E, &[1, 2, 3]).expect_err("overflows image");
        assert_eq!(
            err,
            BusError::OutOfRange {
                address: 0x0010,
                size: 16
            }
        );
        assert_eq!(bus.peek(0x000E), 0, "nothing is written on failure");
    }

    #[test]
    fn full_image_covers_top_address() {
        let mut bus = SimpleBus::with_size(usize::MAX);
        assert_eq!(bus.len(), ADDRESS_SPACE);
        bus.load(0xFFFF, &[0xEA]).expect("last byte fits");
        assert_eq!(bus.peek(0xFFFF), 0xEA);
    }
}
