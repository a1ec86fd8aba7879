use crate::timer::DEFAULT_TIMER_HZ;
use std::time::Duration;

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
pub const DEFAULT_FRAME_RATE: u32 = 60;
/// terminals don't report key releases, so a press is held this many frames
pub const DEFAULT_KEY_HOLD_FRAMES: u32 = 6;
/// fastest rate whose period still comes out as a whole nanosecond
pub const MAX_RATE_HZ: u32 = 1_000_000_000;

/// what the driving loop does when an instruction fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// stop and report the error
    Halt,
    /// log the error and carry on with the next instruction
    Skip,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroRate(&'static str),

    #[error("{0} of {1}Hz is above the {max}Hz limit", max = MAX_RATE_HZ)]
    RateTooHigh(&'static str, u32),
}

/// Run configuration. The core itself doesn't care about any of this; it's
/// the driving loop that decides how often to step, tick and draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub instructions_per_second: u32,
    pub frame_rate: u32,
    pub timer_hz: u32,
    pub on_error: ErrorPolicy,
    pub seed: Option<u64>,
    pub key_hold_frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            frame_rate: DEFAULT_FRAME_RATE,
            timer_hz: DEFAULT_TIMER_HZ,
            on_error: ErrorPolicy::Halt,
            seed: None,
            key_hold_frames: DEFAULT_KEY_HOLD_FRAMES,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("instructions per second", self.instructions_per_second)?;
        check_rate("frame rate", self.frame_rate)?;
        check_rate("timer rate", self.timer_hz)?;
        if self.key_hold_frames == 0 {
            return Err(ConfigError::ZeroRate("key hold frames"));
        }
        Ok(())
    }

    /// how many instruction slots each frame gets; at least one
    pub fn instructions_per_frame(&self) -> u32 {
        (self.instructions_per_second / self.frame_rate).max(1)
    }

    /// logical time one instruction slot takes
    pub fn instruction_period(&self) -> Duration {
        Duration::from_secs(1) / self.instructions_per_second
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate
    }
}

/// a rate has to give a non-zero period, or clocks built on it never settle
fn check_rate(what: &'static str, hz: u32) -> Result<(), ConfigError> {
    match hz {
        0 => Err(ConfigError::ZeroRate(what)),
        hz if hz > MAX_RATE_HZ => Err(ConfigError::RateTooHigh(what, hz)),
        _ => Ok(()),
    }
}
