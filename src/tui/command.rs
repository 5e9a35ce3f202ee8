//! The contract between the event loop and whatever performs side effects.
//!
//! The loop hands each queued [`Command`] to a [`CommandHandler`] along with
//! a snapshot of the current state. The handler answers with either a
//! finished batch of actions or a stream that yields them over time (one per
//! reply chunk, for instance). The loop applies both shapes the same way:
//! reduce, then repaint, once per action.

use std::fmt;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::core::action::{Action, Command};
use crate::core::state::TuiState;

/// Failures a handler can report. The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command needs a selected chat and there is none.
    NoChatSelected,
    /// The chat id doesn't exist in the store.
    ChatNotFound(i64),
    /// Anything raised by the collaborator itself (storage, model API).
    Collaborator(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NoChatSelected => write!(f, "No chat selected"),
            CommandError::ChatNotFound(_) => write!(f, "Chat not found"),
            CommandError::Collaborator(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// What a handler produces for one command.
pub enum CommandOutput {
    /// Actions that are all known up front.
    Batch(Vec<Action>),
    /// Actions delivered incrementally. An `Err` item ends the command.
    Stream(BoxStream<'static, Result<Action, CommandError>>),
}

impl CommandOutput {
    pub fn none() -> Self {
        CommandOutput::Batch(Vec::new())
    }

    /// Collapse either shape into a single stream.
    pub fn into_stream(self) -> BoxStream<'static, Result<Action, CommandError>> {
        match self {
            CommandOutput::Batch(actions) => stream::iter(actions.into_iter().map(Ok)).boxed(),
            CommandOutput::Stream(stream) => stream,
        }
    }
}

impl fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Batch(actions) => f.debug_tuple("Batch").field(actions).finish(),
            CommandOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// Carry out `command`. `state` is the snapshot taken when it was dispatched.
    async fn on_command(
        &self,
        command: &Command,
        state: &TuiState,
    ) -> Result<CommandOutput, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_becomes_stream_in_order() {
        let output = CommandOutput::Batch(vec![Action::FocusNext, Action::ClearInput]);
        let items: Vec<_> = output.into_stream().collect().await;
        assert_eq!(items, vec![Ok(Action::FocusNext), Ok(Action::ClearInput)]);
    }

    #[tokio::test]
    async fn test_stream_passes_through() {
        let inner = stream::iter(vec![
            Ok(Action::AppendStream {
                content: "a".to_string(),
            }),
            Err(CommandError::Collaborator("boom".to_string())),
        ])
        .boxed();
        let items: Vec<_> = CommandOutput::Stream(inner).into_stream().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[test]
    fn test_error_text_is_user_facing() {
        assert_eq!(CommandError::NoChatSelected.to_string(), "No chat selected");
        assert_eq!(CommandError::ChatNotFound(7).to_string(), "Chat not found");
        assert_eq!(
            CommandError::Collaborator("disk full".to_string()).to_string(),
            "disk full"
        );
    }
}
