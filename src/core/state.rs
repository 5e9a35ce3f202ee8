//! # UI State
//!
//! The single snapshot the event loop owns. It is never mutated in place:
//! every change goes through `reduce(state, action)` in action.rs, which
//! consumes the old snapshot and hands back the next one.
//!
//! ```text
//! TuiState
//! ├── mode: Mode                  // Normal (navigate) or Insert (edit)
//! ├── focus: Focus                // highlighted region
//! ├── show_help: bool             // help overlay visible
//! ├── chats: Vec<ChatSummary>     // display order
//! ├── selected_chat_index: usize  // clamped into chats, 0 when empty
//! ├── messages: Vec<MessageSummary>
//! ├── message_scroll_offset: usize
//! ├── input_buffer: String
//! ├── cursor_position: usize      // in chars, not bytes
//! ├── streaming: Streaming        // in-flight assistant reply
//! ├── error: Option<String>       // overlay text
//! └── screen_size: ScreenSize
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Insert,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "[NORMAL]",
            Mode::Insert => "[INSERT]",
        }
    }
}

/// Screen region receiving non-global key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Focus {
    #[default]
    ChatList,
    Messages,
    Input,
}

impl Focus {
    /// Cycle order used by Tab / Shift+Tab.
    pub const ORDER: [Focus; 3] = [Focus::ChatList, Focus::Messages, Focus::Input];

    pub fn next(self) -> Self {
        let index = self.position();
        Self::ORDER[(index + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let index = self.position();
        Self::ORDER[(index + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Focus::ChatList => "chat-list",
            Focus::Messages => "messages",
            Focus::Input => "input",
        }
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: i64,
    pub role: Role,
    pub content: String,
}

/// Accumulates an assistant reply while it is being delivered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streaming {
    pub active: bool,
    pub content: String,
    pub chat_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub rows: u16,
    pub cols: u16,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TuiState {
    pub mode: Mode,
    pub focus: Focus,
    pub show_help: bool,
    pub chats: Vec<ChatSummary>,
    pub selected_chat_index: usize,
    pub messages: Vec<MessageSummary>,
    pub message_scroll_offset: usize,
    pub input_buffer: String,
    /// Cursor position counted in chars (0..=input_buffer.chars().count())
    pub cursor_position: usize,
    pub streaming: Streaming,
    pub error: Option<String>,
    pub screen_size: ScreenSize,
}

impl TuiState {
    pub fn selected_chat(&self) -> Option<&ChatSummary> {
        self.chats.get(self.selected_chat_index)
    }

    pub fn selected_chat_id(&self) -> Option<i64> {
        self.selected_chat().map(|chat| chat.id)
    }

    pub fn input_len(&self) -> usize {
        self.input_buffer.chars().count()
    }
}

/// Caller-supplied partial state, merged over the defaults at loop start.
#[derive(Debug, Clone, Default)]
pub struct StateOverrides {
    pub mode: Option<Mode>,
    pub focus: Option<Focus>,
    pub show_help: Option<bool>,
    pub chats: Option<Vec<ChatSummary>>,
    pub selected_chat_index: Option<usize>,
    pub messages: Option<Vec<MessageSummary>>,
    pub input_buffer: Option<String>,
    pub cursor_position: Option<usize>,
    pub error: Option<String>,
    pub screen_size: Option<ScreenSize>,
}

impl StateOverrides {
    /// Merge the overrides over `base`, re-establishing the index and cursor invariants.
    pub fn apply(self, base: TuiState) -> TuiState {
        let mut state = base;
        if let Some(mode) = self.mode {
            state.mode = mode;
        }
        if let Some(focus) = self.focus {
            state.focus = focus;
        }
        if let Some(show_help) = self.show_help {
            state.show_help = show_help;
        }
        if let Some(chats) = self.chats {
            state.chats = chats;
        }
        if let Some(index) = self.selected_chat_index {
            state.selected_chat_index = index;
        }
        if let Some(messages) = self.messages {
            state.messages = messages;
        }
        if let Some(input) = self.input_buffer {
            state.cursor_position = input.chars().count();
            state.input_buffer = input;
        }
        if let Some(cursor) = self.cursor_position {
            state.cursor_position = cursor;
        }
        if self.error.is_some() {
            state.error = self.error;
        }
        if let Some(size) = self.screen_size {
            state.screen_size = size;
        }

        state.selected_chat_index =
            clamp_index(state.selected_chat_index as i64, state.chats.len());
        state.cursor_position = state.cursor_position.min(state.input_len());
        state
    }
}

/// Clamp into `[0, len - 1]`, or 0 for an empty collection.
pub fn clamp_index(index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.clamp(0, len as i64 - 1) as usize
}
