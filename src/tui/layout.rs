//! Screen layout.
//!
//! Pure functions that split the terminal into the four fixed regions:
//!
//! ```text
//! row 1      ┌ status bar ─────────────────────────────┐
//! row 2..    │ chat list │ messages                     │
//!            │ (≤30 cols)│                              │
//! last 3     │ input                                    │
//!            └──────────────────────────────────────────┘
//! ```
//!
//! Coordinates are 1-based to match ANSI cursor addressing.

const STATUS_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;
const MIN_CONTENT_HEIGHT: u16 = 1;
const MAX_CHAT_WIDTH: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub row: u16,
    pub col: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub fn inner_width(&self) -> u16 {
        self.width.saturating_sub(2)
    }

    pub fn inner_height(&self) -> u16 {
        self.height.saturating_sub(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub status_bar: Region,
    pub chat_list: Region,
    pub messages: Region,
    pub input: Region,
}

/// Compute the regions for a `rows` x `cols` terminal. Zero dimensions are treated as 1.
pub fn layout(rows: u16, cols: u16) -> Layout {
    let rows = rows.max(1);
    let cols = cols.max(1);

    let input_height = if rows < STATUS_HEIGHT + INPUT_HEIGHT + MIN_CONTENT_HEIGHT {
        rows.saturating_sub(STATUS_HEIGHT + MIN_CONTENT_HEIGHT).max(1)
    } else {
        INPUT_HEIGHT
    };
    let content_height = rows
        .saturating_sub(STATUS_HEIGHT + input_height)
        .max(MIN_CONTENT_HEIGHT);

    let status_bar = Region {
        row: 1,
        col: 1,
        width: cols,
        height: STATUS_HEIGHT,
    };

    let content_row = status_bar.row + status_bar.height;
    let chat_width = chat_list_width(cols);

    Layout {
        status_bar,
        chat_list: Region {
            row: content_row,
            col: 1,
            width: chat_width,
            height: content_height,
        },
        messages: Region {
            row: content_row,
            col: chat_width + 1,
            width: cols.saturating_sub(chat_width).max(1),
            height: content_height,
        },
        input: Region {
            row: content_row + content_height,
            col: 1,
            width: cols,
            height: input_height,
        },
    }
}

/// `min(30, floor(cols * 0.3))`, clamped to `[1, cols - 1]`.
fn chat_list_width(cols: u16) -> u16 {
    let upper = cols.saturating_sub(1).max(1);
    let proportional = (u32::from(cols) * 3 / 10).min(u32::from(MAX_CHAT_WIDTH)) as u16;
    proportional.clamp(1, upper)
}

/// A `width` x `height` region centered on the screen, shrunk to fit.
pub fn centered(rows: u16, cols: u16, width: u16, height: u16) -> Region {
    let width = width.min(cols);
    let height = height.min(rows);
    Region {
        row: (rows - height) / 2 + 1,
        col: (cols - width) / 2 + 1,
        width,
        height,
    }
}
