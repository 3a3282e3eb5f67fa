//! The flat ram of the chip.
use crate::{
    definitions::{display::fontset, memory},
    MemoryError,
};

/// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
/// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
/// - `0x200-0xFFF` - Program ROM and work RAM
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    data: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            data: Box::new([0; memory::SIZE]),
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.data.len())
            .finish()
    }
}

impl Memory {
    /// Will create a zero filled memory block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Will create a zero filled memory block with the font set already
    /// placed at [`fontset::LOCATION`].
    pub fn with_font() -> Self {
        let mut mem = Self::new();
        // the fontset is a constant and always fits
        mem.data[fontset::LOCATION as usize..fontset::LOCATION as usize + fontset::FONTSET.len()]
            .copy_from_slice(&fontset::FONTSET);
        mem
    }

    /// Copies the given bytes into memory starting at `offset`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::memory::Memory;
    /// let mut memory = Memory::new();
    /// assert!(memory.load(0x200, &[0x60, 0x0A]).is_ok());
    /// assert_eq!(memory.read8(0x201), Ok(0x0A));
    /// assert!(memory.load(0xFFF, &[0x00, 0x01]).is_err());
    /// ```
    pub fn load(&mut self, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        let end = self.end_of(offset, bytes.len())?;
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read8(&self, address: usize) -> Result<u8, MemoryError> {
        self.data
            .get(address)
            .copied()
            .ok_or(MemoryError::OutOfBounds {
                address,
                len: memory::SIZE,
            })
    }

    pub fn write8(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        match self.data.get_mut(address) {
            Some(entry) => {
                *entry = value;
                Ok(())
            }
            None => Err(MemoryError::OutOfBounds {
                address,
                len: memory::SIZE,
            }),
        }
    }

    /// Returns `len` bytes starting at `offset`, if they are all inside of memory.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], MemoryError> {
        let end = self.end_of(offset, len)?;
        Ok(&self.data[offset..end])
    }

    /// The exclusive end of `len` bytes at `offset`, if they all fit into memory.
    fn end_of(&self, offset: usize, len: usize) -> Result<usize, MemoryError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(MemoryError::OutOfBounds {
                address: offset.saturating_add(len).saturating_sub(1),
                len: memory::SIZE,
            }),
        }
    }

    /// Will return the whole memory block, used for dumps.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Reduces any address to the 12 bit address space of the chip.
#[inline]
pub fn wrap(address: u16) -> usize {
    (address & memory::ADDRESS_MASK) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::cpu;

    #[test]
    fn test_new_is_zeroed() {
        let mem = Memory::new();
        assert_eq!(mem.len(), memory::SIZE);
        assert!(mem.as_slice().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_font_location() {
        let mem = Memory::with_font();
        let start = fontset::LOCATION as usize;
        assert_eq!(mem.slice(start, 5), Ok(&[0xF0, 0x90, 0x90, 0x90, 0xF0][..]));
        assert_eq!(
            mem.slice(start, fontset::FONTSET.len()),
            Ok(&fontset::FONTSET[..])
        );
        // everything before the font is untouched
        assert!(mem.as_slice()[..start].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_load_rom() {
        let mut mem = Memory::new();
        let rom = [0x60, 0x0A, 0x70, 0x05];
        assert_eq!(mem.load(cpu::PROGRAM_COUNTER as usize, &rom), Ok(()));
        assert_eq!(mem.slice(0x200, 4), Ok(&rom[..]));
    }

    #[test]
    fn test_load_up_to_the_last_byte() {
        let mut mem = Memory::new();
        assert_eq!(mem.load(0xFFE, &[1, 2]), Ok(()));
        assert_eq!(mem.read8(0xFFF), Ok(2));
    }

    #[test]
    fn test_load_out_of_bounds() {
        let mut mem = Memory::new();
        let rom = vec![0xAA; memory::SIZE - 0x200 + 1];
        assert_eq!(
            mem.load(0x200, &rom),
            Err(MemoryError::OutOfBounds {
                address: memory::SIZE,
                len: memory::SIZE
            })
        );
        // nothing was written
        assert_eq!(mem.read8(0x200), Ok(0));
    }

    #[test]
    fn test_read_write_bounds() {
        let mut mem = Memory::new();
        assert_eq!(mem.write8(0xFFF, 0x42), Ok(()));
        assert_eq!(mem.read8(0xFFF), Ok(0x42));
        assert!(mem.write8(0x1000, 0x42).is_err());
        assert!(mem.read8(0x1000).is_err());
        assert!(mem.slice(0xFFE, 3).is_err());
    }

    #[test]
    fn test_huge_offsets_do_not_overflow() {
        let mut mem = Memory::new();
        assert_eq!(
            mem.load(usize::MAX, &[1]),
            Err(MemoryError::OutOfBounds {
                address: usize::MAX - 1,
                len: memory::SIZE
            })
        );
        assert!(mem.slice(usize::MAX, 2).is_err());
        assert!(mem.slice(1, usize::MAX).is_err());
        assert_eq!(mem.slice(memory::SIZE, 0), Ok(&[][..]));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(0x0FFF), 0xFFF);
        assert_eq!(wrap(0x1000), 0x000);
        assert_eq!(wrap(0x1234), 0x234);
    }
}
