//! # MessageList Component
//!
//! Bordered panel showing the conversation for the selected chat.
//!
//! ## Rendering Rules
//!
//! - One row per message, first line of its content only, prefixed with
//!   `You:` or `AI:`. Content is cut to fit, without an ellipsis.
//! - Rows start at `scroll_offset`; rows past the panel are not drawn.
//! - While a reply streams in, one extra `AI:` row shows the partial text
//!   followed by a block cursor.
//! - An error, if any, is drawn over the middle row in white on red.
//! - Control characters in content are shown as `�`.

use crate::core::state::{MessageSummary, Role};
use crate::tui::ansi::{Align, bg, fg, pad, printable, styled, truncate, width};
use crate::tui::component::{Component, Frame};
use crate::tui::layout::Region;

pub const STREAM_CURSOR: char = '█';

pub struct MessageList<'a> {
    pub messages: &'a [MessageSummary],
    pub scroll_offset: usize,
    /// Partial reply text, `Some` only while streaming is active
    pub streaming: Option<&'a str>,
    pub error: Option<&'a str>,
    pub focused: bool,
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Region) {
        let border = if self.focused { fg::GREEN } else { fg::GRAY };
        frame.draw_box(area, Some("Messages"), border);

        let inner_width = area.inner_width() as usize;
        let inner_height = area.inner_height() as usize;

        let mut lines: Vec<String> = self
            .messages
            .iter()
            .skip(self.scroll_offset)
            .take(inner_height)
            .map(|message| {
                let (label, color) = role_label(message.role);
                format_line(label, color, first_line(&message.content), inner_width)
            })
            .collect();

        if let Some(partial) = self.streaming {
            if lines.len() < inner_height {
                let text = format!("{}{}", first_line(partial), STREAM_CURSOR);
                lines.push(format_line("AI:", fg::GREEN, &text, inner_width));
            }
        }

        for (offset, line) in lines.iter().enumerate() {
            frame.write_at(area.row + 1 + offset as u16, area.col + 1, line);
        }

        if let Some(error) = self.error {
            let text = pad(
                &truncate(&printable(error), inner_width, ""),
                inner_width,
                Align::Center,
            );
            let row = area.row + area.height / 2;
            frame.write_at(row, area.col + 1, &styled(&text, &[bg::RED, fg::WHITE]));
        }
    }
}

fn role_label(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::User => ("You:", fg::BLUE),
        Role::Assistant => ("AI:", fg::GREEN),
    }
}

fn first_line(content: &str) -> &str {
    let line = content.split('\n').next().unwrap_or("");
    line.strip_suffix('\r').unwrap_or(line)
}

fn format_line(label: &str, color: &str, content: &str, line_width: usize) -> String {
    if line_width == 0 {
        return String::new();
    }
    let label_width = width(label);
    if line_width <= label_width + 1 {
        return truncate(label, line_width, "");
    }
    let content = truncate(&printable(content), line_width - label_width - 1, "");
    format!("{} {}", styled(label, &[color]), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{message, strip_ansi};

    const AREA: Region = Region {
        row: 2,
        col: 10,
        width: 22,
        height: 6,
    };

    fn render(list: MessageList<'_>) -> String {
        let mut list = list;
        let mut frame = Frame::new();
        list.render(&mut frame, AREA);
        frame.finish()
    }

    fn list(messages: &[MessageSummary]) -> MessageList<'_> {
        MessageList {
            messages,
            scroll_offset: 0,
            streaming: None,
            error: None,
            focused: false,
        }
    }

    #[test]
    fn test_labels_and_first_line_only() {
        let messages = vec![
            message(1, Role::User, "Hi\nsecond line"),
            message(2, Role::Assistant, "Hello"),
        ];
        let out = render(list(&messages));
        assert!(out.contains(&format!("{} Hi", styled("You:", &[fg::BLUE]))));
        assert!(out.contains(&format!("{} Hello", styled("AI:", &[fg::GREEN]))));
        assert!(!out.contains("second line"));
    }

    #[test]
    fn test_content_cut_without_ellipsis() {
        let messages = vec![message(1, Role::User, "abcdefghijklmnopqrstuvwxyz")];
        let out = strip_ansi(&render(list(&messages)));
        // inner width 20, "You: " takes 5
        assert!(out.ends_with("You: abcdefghijklmno"));
    }

    #[test]
    fn test_scroll_offset_skips_rows() {
        let messages = vec![
            message(1, Role::User, "first"),
            message(2, Role::Assistant, "second"),
        ];
        let out = render(MessageList {
            scroll_offset: 1,
            ..list(&messages)
        });
        assert!(!out.contains("first"));
        assert!(out.contains("second"));
    }

    #[test]
    fn test_streaming_row_has_cursor() {
        let out = render(MessageList {
            streaming: Some("Thinking"),
            ..list(&[])
        });
        assert!(out.contains("Thinking█"));
    }

    #[test]
    fn test_streaming_row_dropped_when_full() {
        let messages: Vec<_> = (1..=4)
            .map(|id| message(id, Role::User, "row"))
            .collect();
        let out = render(MessageList {
            streaming: Some("partial"),
            ..list(&messages)
        });
        assert!(!out.contains("partial"));
    }

    #[test]
    fn test_control_chars_in_content_are_neutralized() {
        let messages = vec![message(1, Role::Assistant, "hi\x1b[2Jthere\r\nmore")];
        let out = render(MessageList {
            streaming: Some("\x1b[H"),
            ..list(&messages)
        });
        assert!(!out.contains("\x1b[2J"));
        assert!(!out.contains("\x1b[H"));
        assert!(out.contains("hi\u{FFFD}[2Jthere"));
        assert!(out.contains("\u{FFFD}[H█"));
    }

    #[test]
    fn test_error_overlay_centered() {
        let out = render(MessageList {
            error: Some("Oops"),
            ..list(&[])
        });
        let expected = styled(&pad("Oops", 20, Align::Center), &[bg::RED, fg::WHITE]);
        assert!(out.contains(&format!("\x1b[5;11H{expected}")));
    }
}
