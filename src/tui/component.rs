use crate::tui::ansi::{self, cursor};
use crate::tui::layout::Region;

/// Accumulates the escape-coded text of one full repaint.
///
/// Every write is absolute (`move_to` first), so components can draw in any
/// order and later writes overdraw earlier ones.
#[derive(Debug, Default)]
pub struct Frame {
    out: String,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw escape-coded text at the current position.
    pub fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Move to `(row, col)` and write `text`.
    pub fn write_at(&mut self, row: u16, col: u16, text: &str) {
        self.out.push_str(&cursor::move_to(row, col));
        self.out.push_str(text);
    }

    pub fn draw_box(&mut self, area: Region, title: Option<&str>, style: &str) {
        self.out.push_str(&ansi::draw_box(area, title, Some(style)));
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// A reusable UI component.
///
/// Components follow the props pattern: they receive data as struct fields
/// and draw themselves into a `Frame` within a given `Region`.
///
/// # Mutability
///
/// `render` takes `&mut self` so a component can record presentation
/// results during the pass (the input box records where the terminal
/// cursor belongs).
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Region);
}
