//! # Demo Collaborator
//!
//! An in-memory chat store plus a pluggable [`Responder`], wired up as a
//! [`CommandHandler`] so the interface can be driven end to end without a
//! database or a model API.
//!
//! ## Command Behavior
//!
//! - `SendMessage`: trims the input (empty input does nothing), stores the
//!   user message, assembles context from the chat's anchor prompt and its
//!   last few turns, then streams the reply one chunk at a time. The stored
//!   reply and the chat's turn counter are updated when the stream ends.
//! - `CreateChat`: adds a "New Chat" at the top of the list and selects it.
//! - `LoadChat`: replaces the visible messages with the stored ones.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info};

use crate::core::action::{Action, Command};
use crate::core::state::{ChatSummary, MessageSummary, Role, StateOverrides, TuiState};
use crate::tui::command::{CommandError, CommandHandler, CommandOutput};

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";
pub const DEFAULT_ANCHOR_PROMPT: &str = "You are a helpful assistant.";
/// Turns of history (user + assistant pairs) sent along with a new message
const MAX_RECENT_TURNS: usize = 4;

// ============================================================================
// Model Context
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMessage {
    pub role: ContextRole,
    pub content: String,
}

impl ContextMessage {
    fn new(role: ContextRole, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// Anchor prompt, then the most recent history, then the new message.
pub fn assemble_context(
    anchor_prompt: Option<&str>,
    history: &[MessageSummary],
    current: &str,
) -> Vec<ContextMessage> {
    let limit = MAX_RECENT_TURNS * 2;
    let recent = &history[history.len().saturating_sub(limit)..];

    anchor_prompt
        .map(|prompt| ContextMessage::new(ContextRole::System, prompt))
        .into_iter()
        .chain(recent.iter().map(|m| {
            let role = match m.role {
                Role::User => ContextRole::User,
                Role::Assistant => ContextRole::Assistant,
            };
            ContextMessage::new(role, &m.content)
        }))
        .chain(std::iter::once(ContextMessage::new(ContextRole::User, current)))
        .collect()
}

// ============================================================================
// Responder
// ============================================================================

/// Produces a reply for a conversation, as a stream of text chunks.
///
/// `turn` is the 1-based turn the reply belongs to.
pub trait Responder: Send + Sync + 'static {
    fn reply(
        &self,
        turn: u32,
        context: Vec<ContextMessage>,
    ) -> BoxStream<'static, Result<String, CommandError>>;
}

/// Replies by quoting the last user message back, one word per chunk.
pub struct EchoResponder {
    pub delay: Duration,
}

impl Responder for EchoResponder {
    fn reply(
        &self,
        turn: u32,
        context: Vec<ContextMessage>,
    ) -> BoxStream<'static, Result<String, CommandError>> {
        let prompt = context
            .iter()
            .rev()
            .find(|m| m.role == ContextRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let earlier = context
            .iter()
            .filter(|m| m.role != ContextRole::System)
            .count()
            .saturating_sub(1);
        let text =
            format!("Turn {turn}: you said \"{prompt}\" ({earlier} earlier messages in context)");

        let chunks: Vec<String> = text.split_inclusive(' ').map(str::to_string).collect();
        let delay = self.delay;
        stream::iter(chunks)
            .then(move |chunk| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(chunk)
            })
            .boxed()
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug)]
struct StoredChat {
    id: i64,
    title: String,
    anchor_prompt: String,
    turn_count: u32,
    messages: Vec<MessageSummary>,
}

#[derive(Debug, Default)]
struct Store {
    next_chat_id: i64,
    next_message_id: i64,
    /// Display order: newest first
    chats: Vec<StoredChat>,
}

impl Store {
    fn chat(&self, id: i64) -> Result<&StoredChat, CommandError> {
        self.chats
            .iter()
            .find(|c| c.id == id)
            .ok_or(CommandError::ChatNotFound(id))
    }

    fn chat_mut(&mut self, id: i64) -> Result<&mut StoredChat, CommandError> {
        self.chats
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CommandError::ChatNotFound(id))
    }

    fn create_chat(&mut self, title: &str) -> ChatSummary {
        self.next_chat_id += 1;
        let chat = StoredChat {
            id: self.next_chat_id,
            title: title.to_string(),
            anchor_prompt: DEFAULT_ANCHOR_PROMPT.to_string(),
            turn_count: 0,
            messages: Vec::new(),
        };
        let summary = ChatSummary {
            id: chat.id,
            title: chat.title.clone(),
        };
        self.chats.insert(0, chat);
        summary
    }

    fn add_message(
        &mut self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<MessageSummary, CommandError> {
        let id = self.next_message_id + 1;
        let chat = self.chat_mut(chat_id)?;
        let message = MessageSummary {
            id,
            role,
            content: content.to_string(),
        };
        chat.messages.push(message.clone());
        self.next_message_id = id;
        Ok(message)
    }

    fn summaries(&self) -> Vec<ChatSummary> {
        self.chats
            .iter()
            .map(|c| ChatSummary {
                id: c.id,
                title: c.title.clone(),
            })
            .collect()
    }
}

/// In-memory chats backed by a [`Responder`].
pub struct MemoryChats {
    store: Arc<Mutex<Store>>,
    responder: Arc<dyn Responder>,
}

impl MemoryChats {
    pub fn new(responder: impl Responder) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            responder: Arc::new(responder),
        }
    }

    /// A store with a couple of sample chats and an echo responder.
    pub fn seeded(stream_delay: Duration) -> Self {
        let chats = Self::new(EchoResponder { delay: stream_delay });
        {
            let mut store = chats.lock();
            let scratch = store.create_chat("Scratchpad");
            let _ = store.add_message(scratch.id, Role::User, "Notes to self go here");
            let welcome = store.create_chat("Welcome to Parley");
            let _ = store.add_message(welcome.id, Role::User, "What can I do here?");
            let _ = store.add_message(
                welcome.id,
                Role::Assistant,
                "Press i to type, Enter to send, and ? for every key.",
            );
            if let Ok(chat) = store.chat_mut(welcome.id) {
                chat.turn_count = 1;
            }
        }
        chats
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        lock_store(&self.store)
    }

    pub fn create_chat(&self, title: &str) -> ChatSummary {
        self.lock().create_chat(title)
    }

    pub fn add_message(
        &self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<MessageSummary, CommandError> {
        self.lock().add_message(chat_id, role, content)
    }

    pub fn chats(&self) -> Vec<ChatSummary> {
        self.lock().summaries()
    }

    pub fn messages(&self, chat_id: i64) -> Result<Vec<MessageSummary>, CommandError> {
        Ok(self.lock().chat(chat_id)?.messages.clone())
    }

    pub fn turn_count(&self, chat_id: i64) -> Option<u32> {
        self.lock().chat(chat_id).ok().map(|c| c.turn_count)
    }

    /// Starting state: every chat listed, the first one selected with its messages shown.
    pub fn initial_overrides(&self) -> StateOverrides {
        let store = self.lock();
        StateOverrides {
            chats: Some(store.summaries()),
            selected_chat_index: Some(0),
            messages: Some(
                store
                    .chats
                    .first()
                    .map(|c| c.messages.clone())
                    .unwrap_or_default(),
            ),
            ..Default::default()
        }
    }

    fn send_message(&self, state: &TuiState) -> Result<CommandOutput, CommandError> {
        let text = state.input_buffer.trim();
        if text.is_empty() {
            return Ok(CommandOutput::none());
        }
        let chat_id = state.selected_chat_id().ok_or(CommandError::NoChatSelected)?;

        let (user_message, context, turn) = {
            let mut store = self.lock();
            let chat = store.chat(chat_id)?;
            let context = assemble_context(Some(&chat.anchor_prompt), &chat.messages, text);
            let turn = chat.turn_count + 1;
            let user_message = store.add_message(chat_id, Role::User, text)?;
            (user_message, context, turn)
        };
        info!("Sending turn {} of chat {} ({} context messages)", turn, chat_id, context.len());

        let opening = stream::iter(
            [
                Action::SetError { error: None },
                Action::AddMessage {
                    message: user_message,
                },
                Action::ClearInput,
                Action::StartStreaming {
                    chat_id: Some(chat_id),
                },
            ]
            .map(Ok),
        );

        let reply = ReplyStream {
            chunks: self.responder.reply(turn, context),
            text: String::new(),
            chat_id,
            store: self.store.clone(),
        };
        Ok(CommandOutput::Stream(opening.chain(reply.into_actions()).boxed()))
    }

    fn create_chat_actions(&self) -> Vec<Action> {
        let mut store = self.lock();
        let created = store.create_chat(DEFAULT_CHAT_TITLE);
        let chats = store.summaries();
        let index = chats.iter().position(|c| c.id == created.id).unwrap_or(0);
        info!("Created chat {}", created.id);
        vec![
            Action::SetChats { chats },
            Action::SelectChat {
                index: index as i64,
            },
            Action::SetMessages {
                messages: Vec::new(),
            },
            Action::SetError { error: None },
        ]
    }

    fn load_chat_actions(&self, chat_id: i64) -> Result<Vec<Action>, CommandError> {
        let messages = self.messages(chat_id)?;
        debug!("Loaded {} messages for chat {}", messages.len(), chat_id);
        Ok(vec![
            Action::CancelStream,
            Action::SetMessages { messages },
            Action::SetError { error: None },
        ])
    }
}

fn lock_store(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Turns reply chunks into stream actions and stores the finished reply.
struct ReplyStream {
    chunks: BoxStream<'static, Result<String, CommandError>>,
    text: String,
    chat_id: i64,
    store: Arc<Mutex<Store>>,
}

enum ReplyStep {
    Reading(ReplyStream),
    Fail(CommandError),
    Done,
}

impl ReplyStream {
    fn into_actions(self) -> impl futures::Stream<Item = Result<Action, CommandError>> + Send {
        stream::unfold(ReplyStep::Reading(self), |step| async move {
            match step {
                ReplyStep::Reading(mut reply) => match reply.chunks.next().await {
                    Some(Ok(chunk)) => {
                        reply.text.push_str(&chunk);
                        let action = Action::AppendStream { content: chunk };
                        Some((Ok(action), ReplyStep::Reading(reply)))
                    }
                    Some(Err(e)) => Some((Ok(Action::CancelStream), ReplyStep::Fail(e))),
                    None => {
                        let finished = reply.finish();
                        let action = finished.map(|message| Action::CompleteStream { message });
                        Some((action, ReplyStep::Done))
                    }
                },
                ReplyStep::Fail(e) => Some((Err(e), ReplyStep::Done)),
                ReplyStep::Done => None,
            }
        })
    }

    fn finish(self) -> Result<MessageSummary, CommandError> {
        let mut store = lock_store(&self.store);
        let message = store.add_message(self.chat_id, Role::Assistant, &self.text)?;
        store.chat_mut(self.chat_id)?.turn_count += 1;
        debug!("Stored reply for chat {} ({} bytes)", self.chat_id, self.text.len());
        Ok(message)
    }
}

#[async_trait]
impl CommandHandler for MemoryChats {
    async fn on_command(
        &self,
        command: &Command,
        state: &TuiState,
    ) -> Result<CommandOutput, CommandError> {
        match command {
            Command::SendMessage => self.send_message(state),
            Command::CreateChat => Ok(CommandOutput::Batch(self.create_chat_actions())),
            Command::LoadChat { chat_id } => {
                self.load_chat_actions(*chat_id).map(CommandOutput::Batch)
            }
            Command::Quit => Ok(CommandOutput::none()),
        }
    }
}
