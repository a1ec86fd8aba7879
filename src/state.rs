/// # state
///
/// everything the CHIP-8 can see or touch, in one owned value. the
/// interpreter and the timers mutate it; collaborators only read from it,
/// apart from pushing keypad state in once per frame.
use crate::instruction::Reg;
use crate::memory::{Chip8Memory, CHIP8_PROGRAM_ADDR};
use crate::screen::Screen;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

/// VF doubles up as the carry/borrow/collision flag
pub const FLAG_REGISTER: Reg = 0xf;

/// one pressed/released flag per keypad symbol 0x0-0xF
pub type KeyState = [bool; KEY_COUNT];

/// whether the machine is free to fetch, or blocked on FX0A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    Running,
    AwaitingKey { register: Reg },
}

pub struct MachineState {
    pub(crate) memory: Chip8Memory,
    pub(crate) pc: u16,
    pub(crate) i: u16,
    pub(crate) registers: [u8; REGISTER_COUNT],
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) stack_index: usize,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) screen: Screen,
    pub(crate) keys: KeyState,
    pub(crate) key_wait: KeyWait,
    pub(crate) draw_pending: bool,
}

impl MachineState {
    /// zeroed machine with the font loaded and pc at the program start
    pub fn new() -> Self {
        MachineState {
            memory: Chip8Memory::new(),
            pc: CHIP8_PROGRAM_ADDR,
            i: 0,
            registers: [0; REGISTER_COUNT],
            stack: [0; STACK_DEPTH],
            stack_index: 0,
            delay_timer: 0,
            sound_timer: 0,
            screen: Screen::new(),
            keys: [false; KEY_COUNT],
            key_wait: KeyWait::Running,
            draw_pending: false,
        }
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    /// live part of the call stack, oldest return address first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_index]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// a tone should be playing for as long as the sound timer is running
    pub fn is_sounding(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.key_wait, KeyWait::AwaitingKey { .. })
    }

    /// the screen changed since the renderer last looked at it
    pub fn draw_pending(&self) -> bool {
        self.draw_pending
    }

    /// renderer has consumed the screen
    pub fn acknowledge_draw(&mut self) {
        self.draw_pending = false;
    }

    /// take a fresh reading of the keypad. if the machine is blocked on
    /// FX0A and a key has gone from released to pressed since the previous
    /// reading, the lowest such key is written to the waiting register and
    /// the machine runs again. keys held across readings never count.
    /// returns the key that resolved a wait, if any
    pub fn update_keys(&mut self, keys: KeyState) -> Option<u8> {
        let newly_pressed = (0..KEY_COUNT).find(|&k| keys[k] && !self.keys[k]);
        self.keys = keys;

        match (self.key_wait, newly_pressed) {
            (KeyWait::AwaitingKey { register }, Some(key)) => {
                self.registers[register] = key as u8;
                self.key_wait = KeyWait::Running;
                log::debug!("key {:X} resolved wait into V{:X}", key, register);
                Some(key as u8)
            }
            _ => None,
        }
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(keys: &[usize]) -> KeyState {
        let mut state = [false; KEY_COUNT];
        for &k in keys {
            state[k] = true;
        }
        state
    }

    #[test]
    fn test_initial_state() {
        let s = MachineState::new();
        assert_eq!(s.pc(), 0x200);
        assert_eq!(s.i(), 0);
        assert_eq!(s.registers(), &[0; 16]);
        assert!(s.stack().is_empty());
        assert_eq!(s.key_wait(), KeyWait::Running);
        assert!(!s.draw_pending());
        assert!(s.screen().is_blank());
    }

    #[test]
    fn test_update_keys_while_running() {
        let mut s = MachineState::new();
        assert_eq!(s.update_keys(pressed(&[0x3])), None);
        assert!(s.keys()[0x3]);
        assert_eq!(s.registers(), &[0; 16]);
    }

    #[test]
    fn test_wait_resolved_by_new_press() {
        let mut s = MachineState::new();
        s.key_wait = KeyWait::AwaitingKey { register: 0x7 };
        assert_eq!(s.update_keys(pressed(&[])), None);
        assert!(s.is_awaiting_key());
        assert_eq!(s.update_keys(pressed(&[0xb])), Some(0xb));
        assert_eq!(s.registers()[0x7], 0xb);
        assert_eq!(s.key_wait(), KeyWait::Running);
    }

    #[test]
    fn test_wait_ignores_held_key() {
        let mut s = MachineState::new();
        s.update_keys(pressed(&[0x5]));
        s.key_wait = KeyWait::AwaitingKey { register: 0x2 };
        // still holding 5: not an edge
        assert_eq!(s.update_keys(pressed(&[0x5])), None);
        assert!(s.is_awaiting_key());
        // release then press again
        assert_eq!(s.update_keys(pressed(&[])), None);
        assert_eq!(s.update_keys(pressed(&[0x5])), Some(0x5));
        assert_eq!(s.registers()[0x2], 0x5);
    }

    #[test]
    fn test_wait_picks_lowest_new_key() {
        let mut s = MachineState::new();
        s.update_keys(pressed(&[0x1]));
        s.key_wait = KeyWait::AwaitingKey { register: 0x0 };
        assert_eq!(s.update_keys(pressed(&[0x1, 0x9, 0x4])), Some(0x4));
        assert_eq!(s.registers()[0x0], 0x4);
    }

    #[test]
    fn test_acknowledge_draw() {
        let mut s = MachineState::new();
        s.draw_pending = true;
        s.acknowledge_draw();
        assert!(!s.draw_pending());
    }
}
