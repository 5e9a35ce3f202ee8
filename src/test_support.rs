//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::action::Command;
use crate::core::state::{ChatSummary, MessageSummary, Role, TuiState};
use crate::tui::command::{CommandError, CommandHandler, CommandOutput};
use crate::tui::event::{InputEvent, Key, decode};

pub use crate::tui::ansi::strip_ansi;

/// Chats titled in order, with ids 1..=n.
pub fn chats(titles: &[&str]) -> Vec<ChatSummary> {
    titles
        .iter()
        .zip(1..)
        .map(|(title, id)| ChatSummary {
            id,
            title: title.to_string(),
        })
        .collect()
}

pub fn message(id: i64, role: Role, content: &str) -> MessageSummary {
    MessageSummary {
        id,
        role,
        content: content.to_string(),
    }
}

/// Default state with the given input buffer and cursor (in chars).
pub fn state_with_input(text: &str, cursor: usize) -> TuiState {
    TuiState {
        input_buffer: text.to_string(),
        cursor_position: cursor,
        ..Default::default()
    }
}

/// The single event `text` decodes to.
pub fn event(text: &str) -> InputEvent {
    decode(text.as_bytes())
        .into_iter()
        .next()
        .expect("text decodes to at least one event")
}

/// An event for `key` with no raw bytes behind it.
pub fn key_event(key: Key) -> InputEvent {
    InputEvent {
        key,
        raw: String::new(),
    }
}

/// Records every command and does nothing with it.
#[derive(Default)]
pub struct RecordingHandler {
    pub commands: Mutex<Vec<Command>>,
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn on_command(
        &self,
        command: &Command,
        _state: &TuiState,
    ) -> Result<CommandOutput, CommandError> {
        self.commands
            .lock()
            .expect("commands lock")
            .push(command.clone());
        Ok(CommandOutput::none())
    }
}
