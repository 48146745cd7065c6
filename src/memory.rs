//! The CHIP-8's 4k of RAM
//!
//! * 0x000 - 0x1FF is reserved for the interpreter; the hex font lives at the very start of it
//! * 0x200 - 0xFFF is where programs are loaded and run from
use crate::error::{Error, Result};

pub const MEMORY_SIZE: usize = 4096;

/// Where programs get loaded unless told otherwise
pub const STARTING_MEMORY_BYTE: u16 = 0x200;

/// Address of the first byte of the font set
pub const FONT_START: usize = 0x000;

pub const NUM_BYTES_IN_FONT_CHAR: u8 = 5;

/// The 16 5-byte hex digit sprites. Every character is 4 pixels wide and 5 pixels tall
const FONT_SET: [[u8; NUM_BYTES_IN_FONT_CHAR as usize]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0], // 0
    [0x20, 0x60, 0x20, 0x20, 0x70], // 1
    [0xF0, 0x10, 0xF0, 0x80, 0xF0], // 2
    [0xF0, 0x10, 0xF0, 0x10, 0xF0], // 3
    [0x90, 0x90, 0xF0, 0x10, 0x10], // 4
    [0xF0, 0x80, 0xF0, 0x10, 0xF0], // 5
    [0xF0, 0x80, 0xF0, 0x90, 0xF0], // 6
    [0xF0, 0x10, 0x20, 0x40, 0x40], // 7
    [0xF0, 0x90, 0xF0, 0x90, 0xF0], // 8
    [0xF0, 0x90, 0xF0, 0x10, 0xF0], // 9
    [0xF0, 0x90, 0xF0, 0x90, 0x90], // A
    [0xE0, 0x90, 0xE0, 0x90, 0xE0], // B
    [0xF0, 0x80, 0x80, 0x80, 0xF0], // C
    [0xE0, 0x90, 0x90, 0x90, 0xE0], // D
    [0xF0, 0x80, 0xF0, 0x80, 0xF0], // E
    [0xF0, 0x80, 0xF0, 0x80, 0x80], // F
];

/// Flat byte-addressable memory. Every access is bounds checked; nothing wraps.
///
/// The font region is not write protected, a program is free to scribble over it just like it
/// could on the real hardware
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the font set already in place
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        for (i, glyph) in FONT_SET.iter().enumerate() {
            let start = FONT_START + i * glyph.len();
            bytes[start..start + glyph.len()].copy_from_slice(glyph);
        }

        Memory { bytes }
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(Error::OutOfBounds { addr })
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        let byte = self
            .bytes
            .get_mut(addr)
            .ok_or(Error::OutOfBounds { addr })?;
        *byte = value;
        Ok(())
    }

    /// Read the big-endian 16 bit word at `addr` and `addr + 1`
    pub fn read_word(&self, addr: usize) -> Result<u16> {
        let msb = self.read_byte(addr)?;
        let lsb = self.read_byte(addr + 1)?;
        Ok(u16::from(msb) << 8 | u16::from(lsb))
    }

    /// Borrow `len` bytes starting at `addr`. Fails with the first address that does not exist
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        Self::check_range(addr, len)?;
        Ok(&self.bytes[addr..addr + len])
    }

    /// Write all of `data` starting at `addr`, or nothing at all if it would run off the end
    pub fn write_slice(&mut self, addr: usize, data: &[u8]) -> Result<()> {
        Self::check_range(addr, data.len())?;
        self.bytes[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy a raw program image into memory at `origin`
    pub fn load_program(&mut self, program: &[u8], origin: u16) -> Result<()> {
        let origin = origin as usize;
        if origin >= MEMORY_SIZE {
            return Err(Error::OutOfBounds { addr: origin });
        }

        let max = MEMORY_SIZE - origin;
        if program.len() > max {
            return Err(Error::ImageTooLarge {
                size: program.len(),
                max,
            });
        }

        self.bytes[origin..origin + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Address of the sprite for hex digit `digit`. Only the low nibble is looked at
    pub fn font_addr(digit: u8) -> u16 {
        (FONT_START + (digit & 0xF) as usize * NUM_BYTES_IN_FONT_CHAR as usize) as u16
    }

    fn check_range(addr: usize, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        if addr >= MEMORY_SIZE {
            return Err(Error::OutOfBounds { addr });
        }
        let last = addr + len - 1;
        if last >= MEMORY_SIZE {
            return Err(Error::OutOfBounds { addr: MEMORY_SIZE });
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
