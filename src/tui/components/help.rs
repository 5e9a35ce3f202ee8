//! # HelpOverlay Component
//!
//! Centered box listing every default keybinding. On short terminals the
//! list is cut from the bottom, but the closing hint is always the last
//! row shown.

use crate::tui::ansi::{Align, fg, pad, style, styled, truncate};
use crate::tui::component::{Component, Frame};
use crate::tui::layout::{Region, centered};

const WIDTH: u16 = 48;
const HEIGHT: u16 = 25;
const MIN_SIZE: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Header,
    Hint,
}

#[derive(Debug)]
struct HelpLine {
    text: &'static str,
    tone: Tone,
}

const fn line(text: &'static str) -> HelpLine {
    HelpLine {
        text,
        tone: Tone::Plain,
    }
}

const fn header(text: &'static str) -> HelpLine {
    HelpLine {
        text,
        tone: Tone::Header,
    }
}

const LINES: &[HelpLine] = &[
    header("  NORMAL MODE"),
    line("  ?           Show this help"),
    line("  q, Ctrl+c   Quit"),
    line("  j, ↓        Move down"),
    line("  k, ↑        Move up"),
    line("  G           Jump to last chat"),
    line("  n           New chat"),
    line("  i, a        Enter insert mode"),
    line("  h           Focus chat list"),
    line("  l           Focus messages"),
    line("  Tab         Focus next panel"),
    line("  Shift+Tab   Focus previous panel"),
    line("  Ctrl+d      Scroll messages down"),
    line("  Ctrl+u      Scroll messages up"),
    line(""),
    header("  INSERT MODE"),
    line("  Esc         Return to normal mode"),
    line("  Enter       Send message"),
    line("  Ctrl+Enter  Insert newline"),
    line("  Backspace   Delete character"),
    line("  Ctrl+w      Delete word"),
    line("  Ctrl+u      Clear input"),
    HelpLine {
        text: "Press ? or Esc to close",
        tone: Tone::Hint,
    },
];

/// Pick the lines that fit in `inner_height` rows, keeping the final hint.
fn select_lines(inner_height: usize) -> Vec<&'static HelpLine> {
    let Some((hint, body)) = LINES.split_last() else {
        return Vec::new();
    };
    if inner_height == 0 {
        return Vec::new();
    }
    if inner_height >= LINES.len() {
        return LINES.iter().collect();
    }
    body.iter()
        .take(inner_height - 1)
        .chain(std::iter::once(hint))
        .collect()
}

/// Draws over whatever is beneath it; `area` is the whole screen.
pub struct HelpOverlay;

impl Component for HelpOverlay {
    fn render(&mut self, frame: &mut Frame, area: Region) {
        let region = centered(area.height, area.width, WIDTH, HEIGHT);
        if region.width < MIN_SIZE || region.height < MIN_SIZE {
            return;
        }

        frame.draw_box(region, Some("Help"), fg::CYAN);

        let inner_width = region.inner_width() as usize;
        for (offset, help) in select_lines(region.inner_height() as usize).iter().enumerate() {
            let text = truncate(help.text, inner_width, "");
            let rendered = match help.tone {
                Tone::Plain => pad(&text, inner_width, Align::Left),
                Tone::Header => styled(
                    &pad(&text, inner_width, Align::Left),
                    &[style::BOLD, fg::CYAN],
                ),
                Tone::Hint => styled(
                    &pad(&text, inner_width, Align::Center),
                    &[style::DIM, fg::GRAY],
                ),
            };
            frame.write_at(region.row + 1 + offset as u16, region.col + 1, &rendered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::strip_ansi;

    fn render(rows: u16, cols: u16) -> String {
        let mut frame = Frame::new();
        HelpOverlay.render(
            &mut frame,
            Region {
                row: 1,
                col: 1,
                width: cols,
                height: rows,
            },
        );
        frame.finish()
    }

    #[test]
    fn test_full_list_when_room() {
        let out = strip_ansi(&render(30, 80));
        assert!(out.contains("Help"));
        assert!(out.contains("NORMAL MODE"));
        assert!(out.contains("INSERT MODE"));
        assert!(out.contains("n           New chat"));
        assert!(out.contains("Press ? or Esc to close"));
    }

    #[test]
    fn test_box_is_centered() {
        let out = render(30, 80);
        assert!(out.starts_with(&format!("\x1b[3;17H{}+ Help ", fg::CYAN)));
    }

    #[test]
    fn test_hint_survives_short_screen() {
        let out = strip_ansi(&render(6, 40));
        assert!(out.contains("Press ? or Esc to close"));
        assert!(out.contains("NORMAL MODE"));
        assert!(!out.contains("INSERT MODE"));
    }

    #[test]
    fn test_select_lines() {
        assert!(select_lines(0).is_empty());
        let one = select_lines(1);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].tone, Tone::Hint);
        assert_eq!(select_lines(3).len(), 3);
        assert_eq!(select_lines(100).len(), LINES.len());
    }

    #[test]
    fn test_too_small_draws_nothing() {
        assert_eq!(render(3, 80), "");
    }
}
