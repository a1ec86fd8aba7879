///
/// ## Design
///
/// * the machine is one owned `MachineState`; no globals
/// * decode is separate from execute: a raw word becomes an `Instruction`
///   first, then the interpreter applies it
/// * every memory, stack and keypad access is bounds-checked; a bad
///   instruction is an error from `step`, never a panic or a stray write
/// * timers tick at their own fixed logical rate, not once per instruction
///   or once per frame
/// * abstract display, input and sound so the interpreter doesn't need to
///   know how any of them work; starting with TUI in-console
///
/// Model
///
/// Environment
///  |-- display, input, sound, config
///  |-- interpreter
///  |    |-- machine state (memory, registers, stack, timers, screen, keys)
///  |    `-- instruction set
///  `-- main loop, once per frame
///       |-- state.update_keys(input.poll())      // may end an FX0A wait
///       |-- for each instruction slot due this frame {
///       |     interpreter.step();                 // no-op while waiting
///       |     timer::tick() for each 60Hz boundary passed
///       |   }
///       |-- if draw pending: display.draw(screen)
///       |-- sound on/off to follow the sound timer
///       `-- sleep until the next frame
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod screen;
pub mod sound;
pub mod state;
pub mod timer;

pub use config::{Config, ErrorPolicy};
pub use environment::{Environment, RunError};
pub use error::Chip8Error;
pub use instruction::Instruction;
pub use interpreter::{Chip8Interpreter, Cycle};
pub use state::{KeyState, KeyWait, MachineState};
