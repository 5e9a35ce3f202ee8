//! # InputBox Component
//!
//! Bordered bottom panel showing the prompt and the text being composed.
//!
//! ## Responsibilities
//!
//! - Draw `> ` followed by the input buffer, scrolled so the tail stays visible
//! - Work out where the terminal cursor belongs (see `cursor.rs`)
//!
//! The buffer and cursor are props from `TuiState`; editing happens in the
//! reducer, not here. After `render`, [`InputBox::cursor`] reports the
//! screen position the event loop should park the terminal cursor at in
//! Insert mode.

mod cursor;

use crate::core::state::Mode;
use crate::tui::ansi::{Align, fg, pad, styled};
use crate::tui::component::{Component, Frame};
use crate::tui::layout::Region;

use cursor::visible_window;

const PROMPT: &str = ">";
/// Drawn in place of embedded newlines so the row stays one line tall
const NEWLINE_GLYPH: char = '↵';

pub struct InputBox<'a> {
    /// Input buffer (Prop)
    pub buffer: &'a str,
    /// Cursor position in chars (Prop)
    pub cursor_position: usize,
    pub mode: Mode,
    pub focused: bool,
    /// Screen position of the text cursor, set by `render`
    cursor: (u16, u16),
}

impl<'a> InputBox<'a> {
    pub fn new(buffer: &'a str, cursor_position: usize, mode: Mode, focused: bool) -> Self {
        Self {
            buffer,
            cursor_position,
            mode,
            focused,
            cursor: (1, 1),
        }
    }

    /// `(row, col)` of the text cursor as of the last render.
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }
}

impl Component for InputBox<'_> {
    fn render(&mut self, frame: &mut Frame, area: Region) {
        let insert = self.mode == Mode::Insert;
        let border = if self.focused || insert {
            fg::GREEN
        } else {
            fg::GRAY
        };
        frame.draw_box(area, None, border);

        let prompt_style = if insert { fg::YELLOW } else { fg::GRAY };
        let available = (area.inner_width() as usize).saturating_sub(PROMPT.len() + 1);

        let display: String = self
            .buffer
            .chars()
            .map(|c| if c == '\n' { NEWLINE_GLYPH } else { c })
            .collect();
        let window = visible_window(&display, self.cursor_position, available);

        let row = area.row + 1;
        let col = area.col + 1;
        let line = format!(
            "{} {}",
            styled(PROMPT, &[prompt_style]),
            pad(&window.visible, available, Align::Left)
        );
        frame.write_at(row, col, &line);

        let offset = window.cursor_offset.min(available) as u16;
        self.cursor = (row, col + PROMPT.len() as u16 + 1 + offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::strip_ansi;

    const AREA: Region = Region {
        row: 22,
        col: 1,
        width: 20,
        height: 3,
    };

    fn render(input: &mut InputBox<'_>) -> String {
        let mut frame = Frame::new();
        input.render(&mut frame, AREA);
        frame.finish()
    }

    #[test]
    fn test_prompt_and_text() {
        let mut input = InputBox::new("Hello", 5, Mode::Insert, true);
        let out = render(&mut input);
        assert!(strip_ansi(&out).contains("> Hello"));
        assert!(out.contains(&styled(">", &[fg::YELLOW])));
        assert_eq!(input.cursor(), (23, 9));
    }

    #[test]
    fn test_border_green_in_insert_even_unfocused() {
        let mut input = InputBox::new("", 0, Mode::Insert, false);
        assert!(render(&mut input).contains(fg::GREEN));

        let mut input = InputBox::new("", 0, Mode::Normal, false);
        let out = render(&mut input);
        assert!(!out.contains(fg::GREEN));
        assert!(out.contains(&styled(">", &[fg::GRAY])));
    }

    #[test]
    fn test_long_input_scrolls() {
        // inner 18, available 16
        let text = "the quick brown fox jumps";
        let mut input = InputBox::new(text, 25, Mode::Insert, true);
        let out = strip_ansi(&render(&mut input));
        assert!(out.contains("> ...own fox jumps"), "{out}");
        assert_eq!(input.cursor(), (23, 4 + 16));
    }

    #[test]
    fn test_newline_drawn_as_glyph() {
        let mut input = InputBox::new("a\nb", 3, Mode::Insert, true);
        let out = strip_ansi(&render(&mut input));
        assert!(out.contains("> a↵b"));
    }
}
