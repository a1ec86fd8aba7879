use beep::beep;
use std::error::Error;

/// something that can make the CHIP-8's single tone
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker tone via the beep crate
pub struct SimpleBeep {
    pitch: u16,
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        Self::with_pitch(SIMPLEBEEP_PITCH)
    }

    /// `hz` of 0 would mean silence, so it's bumped to 1
    pub fn with_pitch(hz: u16) -> Self {
        SimpleBeep {
            pitch: hz.max(1),
            is_beeping: false,
        }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.is_beeping {
            beep(self.pitch)?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_beeping {
            beep(0)?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct Mute {
    /// how many times a tone was started, for tests
    pub beeps: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
