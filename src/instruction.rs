/// # instruction
///
/// decoding of the 16-bit instruction word into a closed set of operations.
/// nothing in here touches machine state; evaluation lives in the interpreter.
///
/// field naming follows the usual CHIP-8 notation:
///  * `nnn` -- low 12 bits, an address
///  * `nn`  -- low byte, an immediate
///  * `n`   -- low nibble
///  * `x`   -- bits 8-11, a register index
///  * `y`   -- bits 4-7, a register index
use crate::error::Chip8Error;
use std::fmt;

/// register index, 0x0..=0xf
pub type Reg = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN: call a machine code routine; ignored
    Sys(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm { x: Reg, nn: u8 },
    /// 4XNN
    SkipNeImm { x: Reg, nn: u8 },
    /// 5XY0
    SkipEqReg { x: Reg, y: Reg },
    /// 6XNN
    LoadImm { x: Reg, nn: u8 },
    /// 7XNN
    AddImm { x: Reg, nn: u8 },
    /// 8XY0
    Assign { x: Reg, y: Reg },
    /// 8XY1
    Or { x: Reg, y: Reg },
    /// 8XY2
    And { x: Reg, y: Reg },
    /// 8XY3
    Xor { x: Reg, y: Reg },
    /// 8XY4
    AddCarry { x: Reg, y: Reg },
    /// 8XY5
    SubBorrow { x: Reg, y: Reg },
    /// 8XY6
    ShiftRight { x: Reg, y: Reg },
    /// 8XY7
    SubReversed { x: Reg, y: Reg },
    /// 8XYE
    ShiftLeft { x: Reg, y: Reg },
    /// 9XY0
    SkipNeReg { x: Reg, y: Reg },
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random { x: Reg, nn: u8 },
    /// DXYN
    Draw { x: Reg, y: Reg, n: u8 },
    /// EX9E
    SkipKeyPressed { x: Reg },
    /// EXA1
    SkipKeyReleased { x: Reg },
    /// FX07
    LoadDelay { x: Reg },
    /// FX0A
    WaitKey { x: Reg },
    /// FX15
    SetDelay { x: Reg },
    /// FX18
    SetSound { x: Reg },
    /// FX1E
    AddIndex { x: Reg },
    /// FX29
    LoadGlyph { x: Reg },
    /// FX33
    StoreBcd { x: Reg },
    /// FX55
    StoreRegisters { x: Reg },
    /// FX65
    LoadRegisters { x: Reg },
}

impl Instruction {
    /// decode a raw instruction word. fails with `UnknownOpcode` for any
    /// nibble/byte combination that has no defined behaviour
    pub fn decode(raw: u16) -> Result<Instruction, Chip8Error> {
        let nnn = raw & 0x0fff;
        let nn = (raw & 0x00ff) as u8;
        let n = (raw & 0x000f) as u8;
        let x = ((raw >> 8) & 0x0f) as Reg;
        let y = ((raw >> 4) & 0x0f) as Reg;
        let unknown = Err(Chip8Error::UnknownOpcode { opcode: raw });

        let instruction = match raw >> 12 {
            0x0 => match raw {
                0x00e0 => Instruction::ClearScreen,
                0x00ee => Instruction::Return,
                _ => Instruction::Sys(nnn),
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipEqImm { x, nn },
            0x4 => Instruction::SkipNeImm { x, nn },
            0x5 if n == 0 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadImm { x, nn },
            0x7 => Instruction::AddImm { x, nn },
            0x8 => match n {
                0x0 => Instruction::Assign { x, y },
                0x1 => Instruction::Or { x, y },
                0x2 => Instruction::And { x, y },
                0x3 => Instruction::Xor { x, y },
                0x4 => Instruction::AddCarry { x, y },
                0x5 => Instruction::SubBorrow { x, y },
                0x6 => Instruction::ShiftRight { x, y },
                0x7 => Instruction::SubReversed { x, y },
                0xe => Instruction::ShiftLeft { x, y },
                _ => return unknown,
            },
            0x9 if n == 0 => Instruction::SkipNeReg { x, y },
            0xa => Instruction::LoadIndex(nnn),
            0xb => Instruction::JumpOffset(nnn),
            0xc => Instruction::Random { x, nn },
            0xd => Instruction::Draw { x, y, n },
            0xe => match nn {
                0x9e => Instruction::SkipKeyPressed { x },
                0xa1 => Instruction::SkipKeyReleased { x },
                _ => return unknown,
            },
            0xf => match nn {
                0x07 => Instruction::LoadDelay { x },
                0x0a => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1e => Instruction::AddIndex { x },
                0x29 => Instruction::LoadGlyph { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return unknown,
            },
            _ => return unknown,
        };
        Ok(instruction)
    }
}

/// conventional CHIP-8 assembler mnemonics, handy for tracing
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Sys(nnn) => write!(f, "SYS {:#05X}", nnn),
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(nnn) => write!(f, "JP {:#05X}", nnn),
            Instruction::Call(nnn) => write!(f, "CALL {:#05X}", nnn),
            Instruction::SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Instruction::SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Instruction::AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Instruction::Assign { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddCarry { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::SubBorrow { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Instruction::SubReversed { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex(nnn) => write!(f, "LD I, {:#05X}", nnn),
            Instruction::JumpOffset(nnn) => write!(f, "JP V0, {:#05X}", nnn),
            Instruction::Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipKeyReleased { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
