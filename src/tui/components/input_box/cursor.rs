//! Horizontal scrolling for the single-line input.
//!
//! When the buffer is wider than the space after the prompt, only its tail
//! is shown, prefixed with `...`. The cursor offset is mapped into that
//! window. All positions are counted in chars.

const ELLIPSIS: &str = "...";

/// The slice of the buffer that fits, and where the cursor sits inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct InputWindow {
    pub visible: String,
    pub cursor_offset: usize,
}

pub(super) fn visible_window(buffer: &str, cursor: usize, available: usize) -> InputWindow {
    let len = buffer.chars().count();
    if len <= available || available == 0 {
        return InputWindow {
            visible: buffer.to_string(),
            cursor_offset: cursor,
        };
    }

    let window = available.saturating_sub(ELLIPSIS.len());
    let start = len - window;
    let tail: String = buffer.chars().skip(start).collect();
    let visible = format!("{ELLIPSIS}{tail}");
    let cursor_offset =
        (cursor.saturating_sub(start) + ELLIPSIS.len()).min(visible.chars().count());

    InputWindow {
        visible,
        cursor_offset,
    }
}
