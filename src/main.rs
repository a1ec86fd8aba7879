use chip8vm::config::{
    Config, ErrorPolicy, DEFAULT_FRAME_RATE, DEFAULT_INSTRUCTIONS_PER_SECOND,
    DEFAULT_KEY_HOLD_FRAMES,
};
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::Environment;
use chip8vm::input::TerminalInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::timer::DEFAULT_TIMER_HZ;
use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 virtual machine in the terminal", long_about = None)]
struct Args {
    #[arg(short, long, help = "Path to the ROM file to run")]
    rom: PathBuf,

    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, help = "Instructions per second")]
    ips: u32,

    #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE, help = "Frame rate in frames per second")]
    frame_rate: u32,

    #[arg(long, default_value_t = DEFAULT_TIMER_HZ, help = "Delay/sound timer rate in Hz")]
    timer_hz: u32,

    #[arg(long, value_enum, default_value_t = ErrorPolicy::Halt, help = "What to do when an instruction fails")]
    on_error: ErrorPolicy,

    #[arg(long, help = "Seed for the random number instruction")]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_KEY_HOLD_FRAMES, help = "Frames a key stays down after a press")]
    key_hold: u32,

    #[arg(long, help = "Beep through the PC speaker while the sound timer runs")]
    sound: bool,

    #[arg(long, help = "Stop after this many frames")]
    max_frames: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = Config {
        instructions_per_second: args.ips,
        frame_rate: args.frame_rate,
        timer_hz: args.timer_hz,
        on_error: args.on_error,
        seed: args.seed,
        key_hold_frames: args.key_hold,
    };

    // open the program before touching the terminal, so a bad path prints cleanly
    let mut f = File::open(&args.rom)?;

    // initialise
    let mut display = MonoTermDisplay::new()?;
    let mut input = TerminalInput::new(config.key_hold_frames)?;
    let mut sound: Box<dyn Sound> = if args.sound {
        Box::new(SimpleBeep::new())
    } else {
        Box::new(Mute::new())
    };
    let mut env = Environment::new(config, &mut display, &mut input, sound.as_mut())?;
    let len = env.load_program(&mut f)?;
    log::info!("loaded {} bytes from {}", len, args.rom.display());

    let result = env.main_loop(args.max_frames);
    drop(env);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    Ok(result?)
}
