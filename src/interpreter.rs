/// # interpreter
///
/// the fetch/decode/execute engine. a cycle:
///  1. fetch the big-endian word at pc, pc+1
///  2. move pc on by 2, so control flow instructions just overwrite it
///  3. decode into an `Instruction`
///  4. check every bound the instruction needs, then apply it
///
/// if anything in 3 or 4 fails, nothing but the pc has changed. if the fetch
/// itself fails, nothing has changed at all.
use crate::error::Chip8Error;
use crate::instruction::{Instruction, Reg};
use crate::memory::{font_glyph_addr, MemoryMap};
use crate::screen::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::state::{KeyState, KeyWait, MachineState, FLAG_REGISTER, STACK_DEPTH};
use crate::timer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// what a call to `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// fetched, decoded and applied this instruction
    Executed(Instruction),
    /// blocked on FX0A; nothing was fetched
    AwaitingKey,
}

pub struct Chip8Interpreter {
    state: MachineState,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// reproducible CXNN results
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8Interpreter {
            state: MachineState::new(),
            rng,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.state.memory.load_program(reader)
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    /// push the current keypad reading in; may end a wait for a key
    pub fn press_keys(&mut self, keys: KeyState) -> Option<u8> {
        self.state.update_keys(keys)
    }

    /// one tick of the 60Hz timers
    pub fn tick_timers(&mut self) {
        timer::tick(&mut self.state);
    }

    /// run one fetch/decode/execute cycle. does nothing while waiting on a key
    pub fn step(&mut self) -> Result<Cycle, Chip8Error> {
        if self.state.is_awaiting_key() {
            return Ok(Cycle::AwaitingKey);
        }

        let pc = self.state.pc;
        let raw = self.state.memory.get_word(pc)?;
        self.state.pc = pc.wrapping_add(2);

        let instruction = Instruction::decode(raw)?;
        log::trace!("{:#05X}: {:04X}  {}", pc, raw, instruction);
        self.execute(instruction)?;
        Ok(Cycle::Executed(instruction))
    }

    /// apply an already-decoded instruction. expects pc to already point
    /// past it
    pub(crate) fn execute(&mut self, instruction: Instruction) -> Result<(), Chip8Error> {
        let s = &mut self.state;
        match instruction {
            Instruction::Sys(nnn) => {
                log::debug!("ignoring machine code call to {:#05X}", nnn);
            }
            Instruction::ClearScreen => {
                s.screen.clear();
                s.draw_pending = true;
            }
            Instruction::Return => {
                if s.stack_index == 0 {
                    return Err(Chip8Error::StackUnderflow {
                        pc: s.pc.wrapping_sub(2),
                    });
                }
                s.stack_index -= 1;
                s.pc = s.stack[s.stack_index];
            }
            Instruction::Jump(nnn) => s.pc = nnn,
            Instruction::Call(nnn) => {
                if s.stack_index == STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow {
                        pc: s.pc.wrapping_sub(2),
                    });
                }
                s.stack[s.stack_index] = s.pc;
                s.stack_index += 1;
                s.pc = nnn;
            }
            Instruction::SkipEqImm { x, nn } => s.skip_if(s.registers[x] == nn),
            Instruction::SkipNeImm { x, nn } => s.skip_if(s.registers[x] != nn),
            Instruction::SkipEqReg { x, y } => s.skip_if(s.registers[x] == s.registers[y]),
            Instruction::SkipNeReg { x, y } => s.skip_if(s.registers[x] != s.registers[y]),
            Instruction::LoadImm { x, nn } => s.registers[x] = nn,
            Instruction::AddImm { x, nn } => s.registers[x] = s.registers[x].wrapping_add(nn),
            Instruction::Assign { x, y } => s.registers[x] = s.registers[y],
            Instruction::Or { x, y } => s.registers[x] |= s.registers[y],
            Instruction::And { x, y } => s.registers[x] &= s.registers[y],
            Instruction::Xor { x, y } => s.registers[x] ^= s.registers[y],
            Instruction::AddCarry { x, y } => {
                let (sum, carry) = s.registers[x].overflowing_add(s.registers[y]);
                s.set_with_flag(x, sum, carry);
            }
            Instruction::SubBorrow { x, y } => {
                let (vx, vy) = (s.registers[x], s.registers[y]);
                s.set_with_flag(x, vx.wrapping_sub(vy), vx >= vy);
            }
            Instruction::ShiftRight { x, .. } => {
                let vx = s.registers[x];
                s.set_with_flag(x, vx >> 1, vx & 0x01 != 0);
            }
            Instruction::SubReversed { x, y } => {
                let (vx, vy) = (s.registers[x], s.registers[y]);
                s.set_with_flag(x, vy.wrapping_sub(vx), vy >= vx);
            }
            Instruction::ShiftLeft { x, .. } => {
                let vx = s.registers[x];
                s.set_with_flag(x, vx << 1, vx & 0x80 != 0);
            }
            Instruction::LoadIndex(nnn) => s.i = nnn,
            Instruction::JumpOffset(nnn) => s.pc = nnn + s.registers[0] as u16,
            Instruction::Random { x, nn } => s.registers[x] = self.rng.gen::<u8>() & nn,
            Instruction::Draw { x, y, n } => {
                let px = s.registers[x] as usize % SCREEN_WIDTH;
                let py = s.registers[y] as usize % SCREEN_HEIGHT;
                let rows = s.memory.get_ro_slice(s.i, n as usize)?;
                let collision = s.screen.draw_sprite(px, py, rows);
                s.registers[FLAG_REGISTER] = collision as u8;
                s.draw_pending = true;
            }
            Instruction::SkipKeyPressed { x } => s.skip_if(s.key_pressed(x)),
            Instruction::SkipKeyReleased { x } => s.skip_if(!s.key_pressed(x)),
            Instruction::LoadDelay { x } => s.registers[x] = s.delay_timer,
            Instruction::WaitKey { x } => {
                s.key_wait = KeyWait::AwaitingKey { register: x };
                log::debug!("waiting for a key into V{:X}", x);
            }
            Instruction::SetDelay { x } => s.delay_timer = s.registers[x],
            Instruction::SetSound { x } => s.sound_timer = s.registers[x],
            Instruction::AddIndex { x } => s.i = s.i.wrapping_add(s.registers[x] as u16),
            Instruction::LoadGlyph { x } => s.i = font_glyph_addr(s.registers[x]),
            Instruction::StoreBcd { x } => {
                let vx = s.registers[x];
                s.memory.write(&[vx / 100, (vx / 10) % 10, vx % 10], s.i)?;
            }
            Instruction::StoreRegisters { x } => {
                s.memory.write(&s.registers[..=x], s.i)?;
            }
            Instruction::LoadRegisters { x } => {
                let bytes = s.memory.get_ro_slice(s.i, x + 1)?;
                s.registers[..=x].copy_from_slice(bytes);
            }
        }
        Ok(())
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    /// result first, then the flag, so VF ends up as the flag even when x is F
    fn set_with_flag(&mut self, x: Reg, value: u8, flag: bool) {
        self.registers[x] = value;
        self.registers[FLAG_REGISTER] = flag as u8;
    }

    /// keys outside 0x0-0xF don't exist, so are never pressed
    fn key_pressed(&self, x: Reg) -> bool {
        self.keys
            .get(self.registers[x] as usize)
            .copied()
            .unwrap_or(false)
    }
}
