//! # StatusBar Component
//!
//! Top line showing the current mode, the focused region, and whether a
//! reply is streaming in.
//!
//! ## Layout
//!
//! ```text
//! [NORMAL] Focus: chat-list                     Streaming...
//! └─ left part, padded to fill ─────────────────┘└─ right ─┘
//! ```
//!
//! The right part is only present while streaming. The left part is cut
//! (never ellipsized) when the terminal is too narrow.

use crate::core::state::{Focus, Mode};
use crate::tui::ansi::{Align, fg, pad, styled, truncate, width};
use crate::tui::component::{Component, Frame};
use crate::tui::layout::Region;

const STREAMING_TEXT: &str = "Streaming...";

/// Stateless status line. All fields are props.
pub struct StatusBar {
    pub mode: Mode,
    pub focus: Focus,
    pub streaming: bool,
}

impl StatusBar {
    pub fn new(mode: Mode, focus: Focus, streaming: bool) -> Self {
        Self {
            mode,
            focus,
            streaming,
        }
    }

    fn line(&self, total_width: usize) -> String {
        let mode_text = self.mode.label();
        let mode_color = match self.mode {
            Mode::Insert => fg::GREEN,
            Mode::Normal => fg::CYAN,
        };
        let left_plain = format!("{} Focus: {}", mode_text, self.focus.name());
        let reserved_right = if self.streaming {
            width(STREAMING_TEXT) + 1
        } else {
            0
        };
        let left_width = total_width.saturating_sub(reserved_right);
        let left = pad(&truncate(&left_plain, left_width, ""), left_width, Align::Left);
        // Color only the mode label, and only if it survived truncation
        let left = left.replacen(mode_text, &styled(mode_text, &[mode_color]), 1);

        if self.streaming {
            format!("{left} {STREAMING_TEXT}")
        } else {
            left
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Region) {
        let line = self.line(area.width as usize);
        frame.write_at(area.row, area.col, &line);
    }
}
