//! ANSI escape sequences and plain-text sizing helpers.
//!
//! Widths are counted in chars (Unicode scalar values). Wide glyphs are
//! not measured specially.

use crate::tui::layout::Region;

pub mod cursor {
    pub const HIDE: &str = "\x1b[?25l";
    pub const SHOW: &str = "\x1b[?25h";
    pub const HOME: &str = "\x1b[H";

    /// Absolute move, 1-based.
    pub fn move_to(row: u16, col: u16) -> String {
        format!("\x1b[{row};{col}H")
    }
}

pub mod clear {
    pub const SCREEN: &str = "\x1b[2J";
}

pub mod screen {
    pub const ALT: &str = "\x1b[?1049h";
    pub const MAIN: &str = "\x1b[?1049l";
}

pub mod fg {
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const WHITE: &str = "\x1b[37m";
    pub const GRAY: &str = "\x1b[90m";
}

pub mod bg {
    pub const RED: &str = "\x1b[41m";
}

pub mod style {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const INVERSE: &str = "\x1b[7m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// Wrap `text` in the given SGR codes followed by a reset.
pub fn styled(text: &str, styles: &[&str]) -> String {
    if styles.is_empty() {
        return text.to_string();
    }
    format!("{}{}{}", styles.concat(), text, style::RESET)
}

pub fn width(text: &str) -> usize {
    text.chars().count()
}

/// Remove CSI escape sequences, leaving only the printed text.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' || chars.peek() != Some(&'[') {
            out.push(c);
            continue;
        }
        chars.next();
        // Parameters and intermediates, then one final byte in '@'..='~'
        for c in chars.by_ref() {
            if ('@'..='~').contains(&c) {
                break;
            }
        }
    }
    out
}

/// Replace control characters (tabs become spaces) so text can't emit its own sequences.
pub fn printable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_control() => char::REPLACEMENT_CHARACTER,
            c => c,
        })
        .collect()
}

/// Cut `text` to at most `max_width` chars, ending in `ellipsis` when cut.
pub fn truncate(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis_width = width(ellipsis);
    if max_width <= ellipsis_width {
        return ellipsis.chars().take(max_width).collect();
    }
    let kept: String = text.chars().take(max_width - ellipsis_width).collect();
    format!("{kept}{ellipsis}")
}

/// Fit `text` to exactly `width` chars: cut without ellipsis, then pad with spaces.
pub fn pad(text: &str, target: usize, align: Align) -> String {
    if target == 0 {
        return String::new();
    }
    let cut = truncate(text, target, "");
    let padding = target - width(&cut);
    match align {
        Align::Left => format!("{cut}{}", " ".repeat(padding)),
        Align::Right => format!("{}{cut}", " ".repeat(padding)),
        Align::Center => {
            let left = padding / 2;
            format!("{}{cut}{}", " ".repeat(left), " ".repeat(padding - left))
        }
    }
}

/// Characters used for box borders.
#[derive(Debug, Clone, Copy)]
pub struct BorderStyle {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
        }
    }
}

/// Draw a bordered box filling `area`. Each border line is wrapped in `line_style`.
///
/// Boxes narrower or shorter than 2 cells draw nothing.
pub fn draw_box(area: Region, title: Option<&str>, line_style: Option<&str>) -> String {
    if area.width < 2 || area.height < 2 {
        return String::new();
    }

    let border = BorderStyle::default();
    let inner = area.inner_width() as usize;
    let horizontal = |n: usize| border.horizontal.to_string().repeat(n);
    let apply = |line: String| match line_style {
        Some(s) => styled(&line, &[s]),
        None => line,
    };

    let top = match title {
        Some(title) if inner >= 2 => {
            let segment = format!(" {} ", truncate(title, inner - 2, ""));
            let remaining = inner.saturating_sub(width(&segment));
            format!(
                "{}{segment}{}{}",
                border.top_left,
                horizontal(remaining),
                border.top_right
            )
        }
        _ => format!("{}{}{}", border.top_left, horizontal(inner), border.top_right),
    };

    let mut out = String::new();
    out.push_str(&cursor::move_to(area.row, area.col));
    out.push_str(&apply(top));

    let middle = format!("{}{}{}", border.vertical, " ".repeat(inner), border.vertical);
    for offset in 1..area.height - 1 {
        out.push_str(&cursor::move_to(area.row + offset, area.col));
        out.push_str(&apply(middle.clone()));
    }

    let bottom = format!(
        "{}{}{}",
        border.bottom_left,
        horizontal(inner),
        border.bottom_right
    );
    out.push_str(&cursor::move_to(area.row + area.height - 1, area.col));
    out.push_str(&apply(bottom));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::strip_ansi;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello world", 8, "..."), "hello...");
        assert_eq!(truncate("short", 10, "..."), "short");
        assert_eq!(truncate("hello", 2, "..."), "..");
        assert_eq!(truncate("hello", 0, "..."), "");
        assert_eq!(truncate("héllo wörld", 4, ""), "héll");
    }

    #[test]
    fn test_strip_ansi() {
        let text = format!("{}\x1b[3;4H{}", cursor::HIDE, styled("ok", &[fg::GREEN, style::BOLD]));
        assert_eq!(strip_ansi(&text), "ok");
        assert_eq!(strip_ansi("plain \x1b"), "plain \x1b");
    }

    #[test]
    fn test_printable_neutralizes_control_chars() {
        assert_eq!(printable("a\x1b[2Jb"), "a\u{FFFD}[2Jb");
        assert_eq!(printable("over\rwrite\tme"), "over\u{FFFD}write me");
        assert_eq!(printable("héllo █"), "héllo █");
    }

    #[test]
    fn test_pad_alignments() {
        assert_eq!(pad("ab", 5, Align::Left), "ab   ");
        assert_eq!(pad("ab", 5, Align::Right), "   ab");
        assert_eq!(pad("ab", 5, Align::Center), " ab  ");
        assert_eq!(pad("abcdef", 3, Align::Left), "abc");
        assert_eq!(pad("x", 0, Align::Left), "");
    }

    #[test]
    fn test_styled_resets() {
        assert_eq!(styled("hi", &[fg::GREEN]), "\x1b[32mhi\x1b[0m");
        assert_eq!(styled("hi", &[]), "hi");
    }

    #[test]
    fn test_draw_box_with_title() {
        let area = Region {
            row: 2,
            col: 3,
            width: 10,
            height: 3,
        };
        let out = draw_box(area, Some("Chats"), None);
        assert!(out.starts_with("\x1b[2;3H+ Chats --+"));
        assert!(out.contains("\x1b[3;3H|        |"));
        assert!(out.contains("\x1b[4;3H+--------+"));
    }

    #[test]
    fn test_draw_box_truncates_long_title() {
        let area = Region {
            row: 1,
            col: 1,
            width: 8,
            height: 2,
        };
        let out = strip_ansi(&draw_box(area, Some("Messages"), Some(fg::GREEN)));
        assert!(out.starts_with("+ Mess +"));
    }

    #[test]
    fn test_draw_box_too_small() {
        let area = Region {
            row: 1,
            col: 1,
            width: 1,
            height: 5,
        };
        assert_eq!(draw_box(area, None, None), "");
    }
}
