//! # Actions
//!
//! Everything that can change the UI becomes an `Action`.
//! User presses `j`? That's `Action::MoveSelection { delta: 1 }`.
//! A model token arrives? That's `Action::AppendStream { content }`.
//!
//! The `reduce()` function takes the current state and an action,
//! then returns the new state. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  reduce()  →  New State
//! ```
//!
//! Things that need the outside world (persistence, the model) are not
//! actions but `Command`s; the event loop hands those to a collaborator,
//! which answers with more actions.
//!
//! Actions serialize with an internally tagged `type` field
//! (`{"type":"MOVE_SELECTION","delta":1}`), so a session can be logged and
//! replayed. Tags this build doesn't know decode to `Action::Unknown`, which
//! `reduce()` ignores.

use serde::{Deserialize, Serialize};

use crate::core::state::{
    ChatSummary, Focus, MessageSummary, Mode, ScreenSize, Streaming, TuiState, clamp_index,
};

/// `SelectChat` index meaning "the last chat".
pub const LAST_INDEX: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetMode { mode: Mode },
    SetFocus { focus: Focus },
    FocusNext,
    FocusPrev,
    ToggleHelp,
    SetHelp { visible: bool },
    SetChats { chats: Vec<ChatSummary> },
    SelectChat { index: i64 },
    MoveSelection { delta: i64 },
    SetMessages { messages: Vec<MessageSummary> },
    AddMessage { message: MessageSummary },
    ScrollMessages { delta: i64 },
    InsertChar {
        #[serde(rename = "char")]
        ch: char,
    },
    DeleteChar,
    DeleteWord,
    ClearInput,
    SetInput { input: String, cursor: Option<usize> },
    StartStreaming { chat_id: Option<i64> },
    AppendStream { content: String },
    CompleteStream { message: MessageSummary },
    CancelStream,
    SetError { error: Option<String> },
    Resize { rows: u16, cols: u16 },
    #[serde(other)]
    Unknown,
}

/// Requests that need an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Quit,
    SendMessage,
    CreateChat,
    LoadChat { chat_id: i64 },
}

pub fn reduce(state: TuiState, action: Action) -> TuiState {
    match action {
        Action::SetMode { mode } => TuiState { mode, ..state },
        Action::SetFocus { focus } => TuiState { focus, ..state },
        Action::FocusNext => TuiState {
            focus: state.focus.next(),
            ..state
        },
        Action::FocusPrev => TuiState {
            focus: state.focus.prev(),
            ..state
        },
        Action::ToggleHelp => TuiState {
            show_help: !state.show_help,
            ..state
        },
        Action::SetHelp { visible } => TuiState {
            show_help: visible,
            ..state
        },
        Action::SetChats { chats } => {
            // Keep the current selection unless it fell off the end
            let selected_chat_index = clamp_index(state.selected_chat_index as i64, chats.len());
            TuiState {
                chats,
                selected_chat_index,
                ..state
            }
        }
        Action::SelectChat { index } => {
            let desired = if index == LAST_INDEX {
                state.chats.len() as i64 - 1
            } else {
                index
            };
            TuiState {
                selected_chat_index: clamp_index(desired, state.chats.len()),
                ..state
            }
        }
        Action::MoveSelection { delta } => {
            let desired = state.selected_chat_index as i64 + delta;
            TuiState {
                selected_chat_index: clamp_index(desired, state.chats.len()),
                ..state
            }
        }
        Action::SetMessages { messages } => TuiState {
            messages,
            message_scroll_offset: 0,
            ..state
        },
        Action::AddMessage { message } => {
            let mut messages = state.messages;
            messages.push(message);
            TuiState { messages, ..state }
        }
        Action::ScrollMessages { delta } => {
            let offset = (state.message_scroll_offset as i64 + delta).max(0) as usize;
            TuiState {
                message_scroll_offset: offset,
                ..state
            }
        }
        Action::InsertChar { ch } => {
            let cursor = state.cursor_position.min(state.input_len());
            let (before, after) = split_at_char(&state.input_buffer, cursor);
            let input_buffer = format!("{before}{ch}{after}");
            TuiState {
                input_buffer,
                cursor_position: cursor + 1,
                ..state
            }
        }
        Action::DeleteChar => {
            let cursor = state.cursor_position.min(state.input_len());
            if cursor == 0 {
                return state;
            }
            let (before, _) = split_at_char(&state.input_buffer, cursor - 1);
            let (_, after) = split_at_char(&state.input_buffer, cursor);
            let input_buffer = format!("{before}{after}");
            TuiState {
                input_buffer,
                cursor_position: cursor - 1,
                ..state
            }
        }
        Action::DeleteWord => {
            let cursor = state.cursor_position.min(state.input_len());
            let (input_buffer, cursor_position) = delete_word(&state.input_buffer, cursor);
            TuiState {
                input_buffer,
                cursor_position,
                ..state
            }
        }
        Action::ClearInput => TuiState {
            input_buffer: String::new(),
            cursor_position: 0,
            ..state
        },
        Action::SetInput { input, cursor } => {
            let max = input.chars().count();
            let cursor_position = cursor.unwrap_or(max).min(max);
            TuiState {
                input_buffer: input,
                cursor_position,
                ..state
            }
        }
        Action::StartStreaming { chat_id } => TuiState {
            streaming: Streaming {
                active: true,
                content: String::new(),
                chat_id,
            },
            ..state
        },
        Action::AppendStream { content } => {
            let mut streaming = state.streaming;
            streaming.active = true;
            streaming.content.push_str(&content);
            TuiState { streaming, ..state }
        }
        Action::CompleteStream { message } => {
            let mut messages = state.messages;
            messages.push(message);
            TuiState {
                messages,
                streaming: Streaming::default(),
                ..state
            }
        }
        Action::CancelStream => TuiState {
            streaming: Streaming::default(),
            ..state
        },
        Action::SetError { error } => TuiState { error, ..state },
        Action::Resize { rows, cols } => TuiState {
            screen_size: ScreenSize { rows, cols },
            ..state
        },
        Action::Unknown => state,
    }
}

/// Split `text` at a char (not byte) index.
fn split_at_char(text: &str, index: usize) -> (&str, &str) {
    let byte = text
        .char_indices()
        .nth(index)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text.split_at(byte)
}

/// Remove the word (non-whitespace run plus trailing whitespace) before `cursor`.
///
/// A single space is put back only when the deletion would otherwise glue the
/// remaining prefix to a suffix that starts with a non-space character, and
/// the text before the cursor ended in whitespace.
fn delete_word(buffer: &str, cursor: usize) -> (String, usize) {
    let (before, after) = split_at_char(buffer, cursor);

    let without_space = before.trim_end();
    let word_start = without_space
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_whitespace())
        .last()
        .map(|(i, _)| i);
    let trimmed_before = match word_start {
        Some(start) => &before[..start],
        // Only whitespace before the cursor: nothing to delete
        None => before,
    };

    let next_before = trimmed_before.trim_end();
    let needs_space = !next_before.is_empty()
        && !after.is_empty()
        && before.ends_with(char::is_whitespace)
        && !after.starts_with(char::is_whitespace);
    let spacer = if needs_space { " " } else { "" };

    let cursor = next_before.chars().count() + spacer.len();
    (format!("{next_before}{spacer}{after}"), cursor)
}
