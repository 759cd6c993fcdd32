//! Terminal rendering of the grid, one frame per timestep.

use std::io::Write;

use log::warn;

use crate::state::GridState;

const CURSOR_HOME: &str = "\x1b[H";
const NEXT_LINE: &str = "\x1b[E";
const ALIVE: &str = "\x1b[07m  \x1b[m";
const DEAD: &str = "  ";

/// Receives the full current grid once per timestep, before it is evolved.
pub trait Observer {
    fn observe(&mut self, grid: &GridState, timestep: u64);
}

/// Draws alive cells as inverted blanks and dead cells as plain blanks.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        TerminalRenderer {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        TerminalRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One frame: cursor home, then every row followed by a next-line sequence.
pub fn render_frame(grid: &GridState) -> String {
    let row_len = grid.width * ALIVE.len() + NEXT_LINE.len();
    let mut frame = String::with_capacity(CURSOR_HOME.len() + grid.height * row_len);
    frame.push_str(CURSOR_HOME);
    for y in 0..grid.height {
        for x in 0..grid.width {
            frame.push_str(if grid.get(x, y) { ALIVE } else { DEAD });
        }
        frame.push_str(NEXT_LINE);
    }
    frame
}

impl<W: Write> Observer for TerminalRenderer<W> {
    fn observe(&mut self, grid: &GridState, timestep: u64) {
        let frame = render_frame(grid);
        if let Err(err) = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!("failed to render timestep {timestep}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_frame() {
        let mut grid = GridState::new(2, 2).unwrap();
        grid.set(1, 0, true);

        let frame = render_frame(&grid);
        assert_eq!(frame, "\x1b[H  \x1b[07m  \x1b[m\x1b[E    \x1b[E");
    }

    #[test]
    fn test_observer_writes_frame() {
        let mut grid = GridState::new(3, 1).unwrap();
        grid.set(0, 0, true);

        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.observe(&grid, 0);
        renderer.observe(&grid, 1);

        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(written, render_frame(&grid).repeat(2));
    }
}
