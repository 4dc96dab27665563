use crate::Result;
use crate::consts::{FRAMEBUFFER_SIZE, SCREEN_WIDTH};

use std::io::{self, Write};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Draws the machine framebuffer to the terminal.
#[derive(Debug, Default)]
pub struct CLIDisplay;

impl CLIDisplay {
    pub fn new() -> Self {
        CLIDisplay
    }

    pub fn clear(&self) -> Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{CLEAR_SCREEN}")?;
        stdout.flush()?;
        Ok(())
    }

    pub fn show(&self, gfx: &[u8; FRAMEBUFFER_SIZE]) -> Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{CLEAR_SCREEN}{}", render(gfx))?;
        stdout.flush()?;
        Ok(())
    }
}

/// One text line per pixel row, `█` for lit pixels and `░` for dark ones.
pub fn render(gfx: &[u8; FRAMEBUFFER_SIZE]) -> String {
    let mut res = String::with_capacity(FRAMEBUFFER_SIZE * 3 + 32);

    for row in gfx.chunks(SCREEN_WIDTH as usize) {
        for &pixel in row {
            res.push(if pixel == 0 { '░' } else { '█' });
        }

        res.push('\n');
    }

    res
}
