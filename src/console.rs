use crate::display::DisplayState;
use log::trace;
use std::{io::Write, mem};

/// Width of the face, in characters
const FACE_WIDTH: usize = 18;

/// Draws the display state as a few lines of text. The terminal has no idea
/// about colors, so the scheme is printed as a header line.
pub struct ConsoleFace<W> {
    out: W,
    /// The text currently on the screen
    text_buffer: Vec<String>,
    /// The text to be written soon™. Empty except during a render
    next_text_buffer: Vec<String>,
}

impl<W: Write> ConsoleFace<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            text_buffer: Vec::new(),
            next_text_buffer: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Lay out the display state and draw it, if anything changed. Return
    /// whether or not anything was drawn.
    pub fn render(&mut self, state: &DisplayState) -> anyhow::Result<bool> {
        let scheme = state.color_scheme();
        self.add_line(format!(
            "[{} on {}]",
            scheme.foreground(),
            scheme.background()
        ));
        self.add_line(format!(
            "{:^width$}",
            state.date_text().trim(),
            width = FACE_WIDTH
        ));
        self.add_line(format!(
            "{:^width$}",
            state.time_text().trim(),
            width = FACE_WIDTH
        ));
        // Status row is three equal columns
        let column = FACE_WIDTH / 3;
        self.add_line(format!(
            "{:^column$}{:^column$}{:^column$}",
            state.connectivity_text(),
            state.battery_text(),
            state.temperature_text(),
        ));
        self.draw_text()
    }

    fn add_line(&mut self, line: String) {
        self.next_text_buffer.push(line);
    }

    /// If text has changed, flush all text from the buffer and write it out.
    /// If nothing changed, do nothing.
    fn draw_text(&mut self) -> anyhow::Result<bool> {
        if self.next_text_buffer != self.text_buffer {
            trace!(
                "Text changed: old={:?}; new={:?}",
                self.text_buffer,
                self.next_text_buffer
            );
            self.text_buffer = mem::take(&mut self.next_text_buffer);
            writeln!(self.out)?;
            for line in &self.text_buffer {
                writeln!(self.out, "{}", line.trim_end())?;
            }
            self.out.flush()?;
            Ok(true)
        } else {
            self.next_text_buffer.clear();
            Ok(false)
        }
    }
}
