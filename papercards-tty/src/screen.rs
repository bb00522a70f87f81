use std::io::Write;

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};

use crate::layout::{Line, Tone};

pub struct Screen<W: Write> {
    writer: W,
}

impl<W: Write> Screen<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Draws laid-out lines from the top-left corner, one terminal row each.
    pub fn draw(&mut self, lines: &[Line]) -> Result<()> {
        self.begin_sync_update()?;
        for (row, line) in lines.iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            self.writer.queue(cursor::MoveTo(0, row))?;
            for span in &line.spans {
                self.queue_tone(span.tone)?;
                self.writer.queue(Print(&span.text))?;
                self.writer
                    .queue(SetAttribute(Attribute::Reset))?
                    .queue(ResetColor)?;
            }
        }
        self.end_sync_update()
    }

    fn queue_tone(&mut self, tone: Tone) -> Result<()> {
        match tone {
            Tone::Plain => {}
            Tone::Bold => {
                self.writer.queue(SetAttribute(Attribute::Bold))?;
            }
            Tone::Dim => {
                self.writer.queue(SetAttribute(Attribute::Dim))?;
            }
            Tone::Reverse => {
                self.writer.queue(SetAttribute(Attribute::Reverse))?;
            }
            Tone::Warning => {
                self.writer.queue(SetForegroundColor(Color::Yellow))?;
            }
        }
        Ok(())
    }

    pub fn begin_sync_update(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}[?2026h")?;
        Ok(())
    }

    /// Ends the synchronized update so the terminal shows the whole frame at once.
    pub fn end_sync_update(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}[?2026l")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        crossterm::execute!(
            &mut self.writer,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_wraps_frame_in_sync_update() {
        let mut screen = Screen::new(Vec::new());
        screen.draw(&[Line::plain("hello")]).unwrap();
        let output = String::from_utf8(screen.into_inner()).unwrap();
        assert!(output.starts_with("\u{1b}[?2026h"));
        assert!(output.ends_with("\u{1b}[?2026l"));
        assert!(output.contains("hello"));
    }

    #[test]
    fn draw_positions_each_line_and_styles_spans() {
        let mut screen = Screen::new(Vec::new());
        let mut second = Line::styled("bold", Tone::Bold);
        second.push("warn", Tone::Warning);
        screen.draw(&[Line::plain("first"), second]).unwrap();
        let output = String::from_utf8(screen.into_inner()).unwrap();

        // MoveTo is 1-based on the wire
        assert!(output.contains("\u{1b}[1;1Hfirst"));
        assert!(output.contains("\u{1b}[2;1H"));
        assert!(output.contains("\u{1b}[1mbold"));
        assert!(output.contains("\u{1b}[38;5;"));
        assert!(output.contains("warn"));
    }

    #[test]
    fn clear_all_homes_the_cursor() {
        let mut screen = Screen::new(Vec::new());
        screen.clear_all().unwrap();
        let output = String::from_utf8(screen.into_inner()).unwrap();
        assert!(output.contains("\u{1b}[2J"));
        assert!(output.ends_with("\u{1b}[1;1H"));
    }
}
