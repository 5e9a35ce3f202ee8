//! # ChatList Component
//!
//! Bordered left-hand panel listing chat titles. The selected row gets a
//! `>` marker and inverse video. Titles that don't fit end in `...`.
//! With no chats, a short hint explains how to create one.

use crate::core::state::ChatSummary;
use crate::tui::ansi::{Align, fg, pad, printable, style, styled, truncate};
use crate::tui::component::{Component, Frame};
use crate::tui::layout::Region;

const EMPTY_HINT: [&str; 2] = ["No chats yet", "Press n to create one"];

pub struct ChatList<'a> {
    pub chats: &'a [ChatSummary],
    pub selected: usize,
    pub focused: bool,
}

impl<'a> ChatList<'a> {
    pub fn new(chats: &'a [ChatSummary], selected: usize, focused: bool) -> Self {
        Self {
            chats,
            selected,
            focused,
        }
    }

    fn row_text(&self, index: usize, inner_width: usize) -> String {
        let is_selected = index == self.selected && !self.chats.is_empty();
        let title = self
            .chats
            .get(index)
            .map(|c| printable(&c.title))
            .unwrap_or_default();
        let marker = if is_selected { '>' } else { ' ' };
        let line = truncate(&format!("{marker} {title}"), inner_width, "...");
        let line = pad(&line, inner_width, Align::Left);
        if is_selected {
            styled(&line, &[style::INVERSE])
        } else {
            line
        }
    }
}

impl Component for ChatList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Region) {
        let border = if self.focused { fg::GREEN } else { fg::GRAY };
        frame.draw_box(area, Some("Chats"), border);

        let inner_width = area.inner_width() as usize;
        let inner_height = area.inner_height();

        if self.chats.is_empty() {
            for (offset, hint) in (0..inner_height).zip(EMPTY_HINT) {
                let text = pad(&truncate(hint, inner_width, "..."), inner_width, Align::Left);
                frame.write_at(area.row + 1 + offset, area.col + 1, &styled(&text, &[fg::GRAY]));
            }
            return;
        }

        for offset in 0..inner_height {
            let text = self.row_text(offset as usize, inner_width);
            frame.write_at(area.row + 1 + offset, area.col + 1, &text);
        }
    }
}
