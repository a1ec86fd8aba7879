use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map. Every access is bounds-checked, so a misbehaving
/// program gets an error back instead of a panic or a write into whatever
/// happens to be next door.
pub trait MemoryMap {
    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error>;

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn read_byte(&self, addr: u16) -> Result<u8, Chip8Error> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16, Chip8Error> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// the biggest program that fits between 0x200 and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex font lives, and how tall each glyph is
pub const CHIP8_FONT_ADDR: u16 = 0x050;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  reserved
///   0x0050-0x009f  hex font, 16 glyphs of 5 bytes
///   0x00a0-0x01ff  reserved
///   0x0200-0x0fff  program
///
/// the stack, registers and display live outside of addressable memory
pub struct Chip8Memory {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8Memory {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(Chip8Error::MemoryOutOfRange { address: a, len })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let a = addr as usize;
        self.bytes
            .get(a..a + len)
            .ok_or(Chip8Error::MemoryOutOfRange { address: a, len })
    }
}

impl Chip8Memory {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8Memory { bytes }
    }

    /// load a CHIP-8 program at 0x200, returning how many bytes were loaded.
    /// programs that don't fit are rejected whole; memory is left untouched
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        if len > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: len,
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(&buf, CHIP8_PROGRAM_ADDR)?;
        log::debug!("loaded {} program bytes at {:#05X}", len, CHIP8_PROGRAM_ADDR);
        Ok(len)
    }

    /// the whole address space, read only
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// address of the glyph for the low nibble of `digit`
pub fn font_glyph_addr(digit: u8) -> u16 {
    CHIP8_FONT_ADDR + CHIP8_FONT_GLYPH_BYTES * (digit & 0x0f) as u16
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
