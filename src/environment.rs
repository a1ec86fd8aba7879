/// # environment
///
/// sets everything up around the interpreter and runs the main loop. each
/// frame:
///  1. read the keypad and hand it to the machine (may end a key wait)
///  2. run this frame's share of instruction slots. every slot moves logical
///     time on by one instruction period, and the timers tick whenever a
///     60Hz boundary goes by, whether or not the machine is blocked on a key.
///     the share is itself counted off a clock, so rates that don't divide
///     evenly into the frame rate don't drift
///  3. if the screen changed, draw it and clear the signal
///  4. start or stop the tone to follow the sound timer
///
/// the core never looks at the wall clock; only `main_loop` sleeps, to keep
/// frames at the configured rate.
use crate::config::{Config, ConfigError, ErrorPolicy};
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Input;
use crate::interpreter::{Chip8Interpreter, Cycle};
use crate::sound::Sound;
use crate::timer::TimerClock;
use std::io;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Machine(#[from] Chip8Error),

    #[error("bad configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("display or input device error: {0}")]
    Device(#[from] io::Error),

    #[error("sound device error: {0}")]
    Sound(String),
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    config: Config,
    slot_clock: TimerClock,
    timer_clock: TimerClock,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    beeping: bool,
    frames: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Result<Environment<'a>, RunError> {
        config.validate()?;
        let interpreter = match config.seed {
            Some(seed) => Chip8Interpreter::with_seed(seed),
            None => Chip8Interpreter::new(),
        };
        Ok(Environment {
            interpreter,
            slot_clock: TimerClock::new(config.instructions_per_second),
            timer_clock: TimerClock::new(config.timer_hz),
            config,
            display,
            input,
            sound,
            beeping: false,
            frames: 0,
        })
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, RunError> {
        Ok(self.interpreter.load_program(reader)?)
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// run one frame: keypad, instructions and timers, screen, sound
    pub fn run_frame(&mut self) -> Result<(), RunError> {
        let keys = self.input.poll()?;
        self.interpreter.press_keys(keys);

        let period = self.config.instruction_period();
        let slots = self.slot_clock.advance(self.config.frame_period());
        for _ in 0..slots {
            let pc = self.interpreter.state().pc();
            match self.interpreter.step() {
                Ok(Cycle::Executed(_)) | Ok(Cycle::AwaitingKey) => {}
                // a failed fetch leaves pc where it was, so there's nothing to skip
                Err(e) if self.interpreter.state().pc() == pc => return Err(e.into()),
                Err(e) => match self.config.on_error {
                    ErrorPolicy::Halt => return Err(e.into()),
                    ErrorPolicy::Skip => log::warn!("skipping: {}", e),
                },
            }
            for _ in 0..self.timer_clock.advance(period) {
                self.interpreter.tick_timers();
            }
        }

        if self.interpreter.state().draw_pending() {
            self.display.draw(self.interpreter.state().screen())?;
            self.interpreter.state_mut().acknowledge_draw();
        }

        self.update_sound()?;
        self.frames += 1;
        Ok(())
    }

    fn update_sound(&mut self) -> Result<(), RunError> {
        let sounding = self.interpreter.state().is_sounding();
        if sounding != self.beeping {
            let res = if sounding {
                self.sound.beep()
            } else {
                self.sound.stop()
            };
            res.map_err(|e| RunError::Sound(e.to_string()))?;
            self.beeping = sounding;
        }
        Ok(())
    }

    /// run frames at the configured rate until the input asks to quit or
    /// `max_frames` have gone by
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<(), RunError> {
        let frame_period = self.config.frame_period();
        let mut deadline = Instant::now();
        log::info!(
            "running at {} instructions/s (~{} per frame), {} frames/s, timers at {}Hz",
            self.config.instructions_per_second,
            self.config.instructions_per_frame(),
            self.config.frame_rate,
            self.config.timer_hz
        );

        while !self.input.quit_requested() && max_frames.map_or(true, |max| self.frames < max) {
            self.run_frame()?;

            deadline += frame_period;
            let now = Instant::now();
            if deadline > now {
                spin_sleep::sleep(deadline - now);
            } else {
                // running behind; don't try to catch up
                deadline = now;
            }
        }

        if self.beeping {
            self.sound
                .stop()
                .map_err(|e| RunError::Sound(e.to_string()))?;
        }
        log::info!("stopped after {} frames", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::sound::Mute;
    use crate::state::KeyWait;

    fn program(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    fn config() -> Config {
        Config {
            seed: Some(7),
            ..Config::default()
        }
    }

    #[test]
    fn test_end_to_end_rom() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]; 3]);
        let mut sound = Mute::new();
        let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
        env.load_program(&mut program(&[0x6005, 0x7003, 0x1204]).as_slice())?;

        env.run_frame()?;
        let s = env.interpreter().state();
        assert_eq!(s.registers()[0], 8);
        assert_eq!(s.pc(), 0x204);
        env.run_frame()?;
        assert_eq!(env.interpreter().state().pc(), 0x204);
        assert_eq!(env.frames(), 2);
        Ok(())
    }

    #[test]
    fn test_draws_only_when_signalled() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]; 4]);
        let mut sound = Mute::new();
        {
            // draw glyph 0 once, then spin
            let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
            env.load_program(&mut program(&[0xa050, 0xd005, 0x1204]).as_slice())?;
            env.run_frame()?;
            env.run_frame()?;
            env.run_frame()?;
            assert!(!env.interpreter().state().draw_pending());
        }
        assert_eq!(display.frames_drawn, 1);
        let frame = display.last_frame.expect("a frame was drawn");
        assert_eq!(frame.lit_pixels().count(), 14);
        Ok(())
    }

    #[test]
    fn test_timers_decay_at_60hz_regardless_of_ips() -> Result<(), RunError> {
        for ips in [60, 700, 2000] {
            let mut display = DummyDisplay::new();
            let mut input = DummyInput::new(&[[false; 16]; 60]);
            let mut sound = Mute::new();
            let cfg = Config {
                instructions_per_second: ips,
                ..config()
            };
            let mut env = Environment::new(cfg, &mut display, &mut input, &mut sound)?;
            // delay = 0xff, then spin
            env.load_program(&mut program(&[0x60ff, 0xf015, 0x1204]).as_slice())?;
            for _ in 0..30 {
                env.run_frame()?;
            }
            // half a second of logical time is 30 ticks, give or take the
            // instruction slot the delay was set in
            let dt = env.interpreter().state().delay_timer();
            assert!((0xff - 31..=0xff - 29).contains(&dt), "ips {}: delay {}", ips, dt);
        }
        Ok(())
    }

    #[test]
    fn test_key_wait_across_frames() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let frames = [
            DummyInput::pressed(&[]),
            DummyInput::pressed(&[]),
            DummyInput::pressed(&[0x9]),
            DummyInput::pressed(&[0x9]),
        ];
        let mut input = DummyInput::new(&frames);
        let mut sound = Mute::new();
        let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
        // delay = 0x40, wait for key into V5, then count V6 up forever
        env.load_program(
            &mut program(&[0x6040, 0xf015, 0xf50a, 0x7601, 0x1206]).as_slice(),
        )?;

        env.run_frame()?;
        env.run_frame()?;
        let s = env.interpreter().state();
        assert_eq!(s.key_wait(), KeyWait::AwaitingKey { register: 5 });
        assert_eq!(s.pc(), 0x206);
        assert_eq!(s.registers()[6], 0);
        // timers kept going while blocked
        assert!(s.delay_timer() < 0x40);

        env.run_frame()?;
        let s = env.interpreter().state();
        assert_eq!(s.key_wait(), KeyWait::Running);
        assert_eq!(s.registers()[5], 0x9);
        let counted = s.registers()[6];
        assert!(counted > 0);

        // key still held: nothing more to resolve, machine keeps running
        env.run_frame()?;
        assert_eq!(env.interpreter().state().registers()[5], 0x9);
        assert!(env.interpreter().state().registers()[6] > counted);
        Ok(())
    }

    #[test]
    fn test_halt_on_error() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]]);
        let mut sound = Mute::new();
        let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
        env.load_program(&mut program(&[0x00ee]).as_slice())?;
        match env.run_frame() {
            Err(RunError::Machine(Chip8Error::StackUnderflow { pc: 0x200 })) => Ok(()),
            other => panic!("expected stack underflow, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_on_error() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]]);
        let mut sound = Mute::new();
        let cfg = Config {
            on_error: ErrorPolicy::Skip,
            ..config()
        };
        let mut env = Environment::new(cfg, &mut display, &mut input, &mut sound)?;
        // bad ALU op, then set V1 and spin
        env.load_program(&mut program(&[0x812f, 0x6133, 0x1204]).as_slice())?;
        env.run_frame()?;
        assert_eq!(env.interpreter().state().registers()[1], 0x33);
        Ok(())
    }

    #[test]
    fn test_skip_cannot_get_past_failed_fetch() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]; 2]);
        let mut sound = Mute::new();
        let cfg = Config {
            on_error: ErrorPolicy::Skip,
            ..config()
        };
        let mut env = Environment::new(cfg, &mut display, &mut input, &mut sound)?;
        // jump to the last byte of memory, where no whole word can be fetched
        env.load_program(&mut program(&[0x1fff]).as_slice())?;
        match env.run_frame() {
            Err(RunError::Machine(Chip8Error::MemoryOutOfRange { address: 0xfff, len: 2 })) => {}
            other => panic!("expected fetch failure, got {:?}", other),
        }
        assert_eq!(env.interpreter().state().pc(), 0xfff);
        assert_eq!(env.frames(), 0);
        Ok(())
    }

    #[test]
    fn test_sound_follows_timer() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]; 20]);
        let mut sound = Mute::new();
        {
            let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
            // sound = 3 ticks, then spin
            env.load_program(&mut program(&[0x6003, 0xf018, 0x1204]).as_slice())?;
            env.run_frame()?;
            assert!(env.beeping);
            for _ in 0..5 {
                env.run_frame()?;
            }
            assert!(!env.beeping);
            assert_eq!(env.interpreter().state().sound_timer(), 0);
        }
        assert_eq!(sound.beeps, 1);
        Ok(())
    }

    #[test]
    fn test_main_loop_stops_when_input_done() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]; 3]);
        let mut sound = Mute::new();
        let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
        env.load_program(&mut program(&[0x1200]).as_slice())?;
        env.main_loop(None)?;
        assert_eq!(env.frames(), 3);
        Ok(())
    }

    #[test]
    fn test_main_loop_max_frames() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[[false; 16]; 10]);
        let mut sound = Mute::new();
        let mut env = Environment::new(config(), &mut display, &mut input, &mut sound)?;
        env.load_program(&mut program(&[0x1200]).as_slice())?;
        env.main_loop(Some(2))?;
        assert_eq!(env.frames(), 2);
        Ok(())
    }

    #[test]
    fn test_bad_config_rejected() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let cfg = Config {
            frame_rate: 0,
            ..config()
        };
        assert!(matches!(
            Environment::new(cfg, &mut display, &mut input, &mut sound),
            Err(RunError::Config(_))
        ));
    }
}
