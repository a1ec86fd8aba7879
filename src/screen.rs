/// internal resolution of the CHIP-8 display
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// monochrome 64x32 pixel grid. pixels are only ever changed by XOR-ing
/// sprites onto it, or by clearing the whole thing
#[derive(Clone, PartialEq, Eq)]
pub struct Screen {
    cells: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Screen {
    pub fn new() -> Self {
        Screen {
            cells: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// whether the pixel at (x, y) is lit; anything off-screen is dark
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.cells[y * SCREEN_WIDTH + x]
    }

    /// XOR a sprite onto the grid with its top-left corner at (x, y). each
    /// byte of `rows` is one 8-pixel row, most significant bit leftmost.
    /// bits that fall off the right or bottom edge are dropped, not wrapped.
    /// returns true if any lit pixel was switched off
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            let py = y + dy;
            if py >= SCREEN_HEIGHT {
                break;
            }
            for dx in 0..8 {
                let px = x + dx;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if row & (0x80 >> dx) != 0 {
                    let cell = &mut self.cells[py * SCREEN_WIDTH + px];
                    collision |= *cell;
                    *cell = !*cell;
                }
            }
        }
        collision
    }

    /// coordinates of every lit pixel, row by row
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(idx, _)| (idx % SCREEN_WIDTH, idx / SCREEN_WIDTH))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&on| !on)
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// one line per row, '#' for lit and '.' for dark
impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(SCREEN_WIDTH) {
            let line: String = row.iter().map(|&on| if on { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
