use std::io;

/// Everything that can go wrong inside the virtual machine. All of these are
/// recoverable at the granularity of a single `step`: the machine state is
/// left as it was before the failing instruction, apart from the program
/// counter having moved past it.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("stack overflow: call at {pc:#05X} with all 16 return slots in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of range: {len} byte(s) at {address:#06X}")]
    MemoryOutOfRange { address: usize, len: usize },

    #[error("program is too large ({size} bytes), at most {max} bytes fit")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
