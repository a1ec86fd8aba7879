use crate::screen::{Screen, SCREEN_HEIGHT, SCREEN_WIDTH};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the environment to put the machine's screen in front
/// of a person. It should abstract the implementation details, so a variety
/// of kinds of screen would work.
pub trait Display {
    /// present the whole pixel grid
    fn draw(&mut self, screen: &Screen) -> Result<(), io::Error>;
}

// canvas coords have y going up, so the chip-8's row 0 sits at the top
fn x_bounds() -> [f64; 2] {
    [0.0, (SCREEN_WIDTH - 1) as f64]
}

fn y_bounds() -> [f64; 2] {
    [-1.0 * (SCREEN_HEIGHT - 1) as f64, 0.0]
}

/// expand lit pixels into x, y float coords, suitable for rendering with TUI
fn canvas_points(screen: &Screen) -> Vec<(f64, f64)> {
    screen
        .lit_pixels()
        .map(|(x, y)| (x as f64, -1.0 * y as f64))
        .collect()
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay { terminal })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.show_cursor() {
            log::warn!("couldn't restore the cursor: {}", e);
        }
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, screen: &Screen) -> Result<(), io::Error> {
        let coords = canvas_points(screen);
        // for now this assumes a 1:1 ratio between terminal cells and chip8
        // pixels, plus a border
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + SCREEN_WIDTH as u16, 2 + SCREEN_HEIGHT as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds())
                .y_bounds(y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was asked to
/// draw
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub last_frame: Option<Screen>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, screen: &Screen) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        self.last_frame = Some(screen.clone());
        Ok(())
    }
}
