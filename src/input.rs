use crate::state::{KeyState, KEY_COUNT};
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// map of keyboard characters to COSMAC keypad symbols, using the left-hand
/// side of a qwerty keyboard:
///
///   1 2 3 C      1 2 3 4
///   4 5 6 D      q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// reads the keypad once per frame
pub trait Input {
    /// current pressed/released state of all 16 keys
    fn poll(&mut self) -> Result<KeyState, io::Error>;

    /// the person at the keyboard wants to stop
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Keypad read from the terminal with Crossterm. terminals only report key
/// presses (and autorepeat), never releases, so each press keeps its key
/// down for `hold_frames` polls, refreshed by autorepeat.
pub struct TerminalInput {
    keymap: HashMap<char, u8>,
    hold: [u32; KEY_COUNT],
    hold_frames: u32,
    quit: bool,
}

impl TerminalInput {
    pub fn new(hold_frames: u32) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TerminalInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            hold: [0; KEY_COUNT],
            // a hold of 0 would release every key before it's ever read
            hold_frames: hold_frames.max(1),
            quit: false,
        })
    }

    fn read_terminal(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.hold[mapped_key as usize] = self.hold_frames,
                        None => log::warn!("can't map {:?} to a COSMAC key", key),
                    },
                    other => log::warn!("unmapped key event {:?}", other),
                },
                Event::Resize(..) => {}
                other => log::debug!("ignoring terminal event {:?}", other),
            }
        }
        Ok(())
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("couldn't leave raw mode: {}", e);
        }
    }
}

impl Input for TerminalInput {
    fn poll(&mut self) -> Result<KeyState, io::Error> {
        for frames in self.hold.iter_mut() {
            *frames = frames.saturating_sub(1);
        }
        self.read_terminal()?;
        Ok(self.hold.map(|frames| frames > 0))
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing; replays a script of keypad
/// readings, one per poll, then reports everything released and asks to quit
pub struct DummyInput {
    frames: VecDeque<KeyState>,
}

impl DummyInput {
    pub fn new(frames: &[KeyState]) -> Self {
        DummyInput {
            frames: frames.iter().copied().collect(),
        }
    }

    /// a single reading with just these keys down
    pub fn pressed(keys: &[u8]) -> KeyState {
        let mut state = [false; KEY_COUNT];
        for &k in keys {
            state[k as usize & 0x0f] = true;
        }
        state
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<KeyState, io::Error> {
        Ok(self.frames.pop_front().unwrap_or([false; KEY_COUNT]))
    }

    fn quit_requested(&self) -> bool {
        self.frames.is_empty()
    }
}
