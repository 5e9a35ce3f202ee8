//! # TUI Adapter
//!
//! The raw-ANSI terminal layer. Decodes stdin bytes into key events,
//! resolves them against the keymap, feeds the resulting actions through
//! the core reducer, repaints, and runs commands against an external
//! [`CommandHandler`].
//!
//! ```text
//! stdin ─▶ event::decode ─▶ keymap::resolve ─┬─▶ actions ─▶ reduce ─▶ ui::render ─▶ stdout
//!                                            └─▶ commands ─▶ queue ─▶ handler
//!                                                                       │
//!                         reduce ◀── actions (batch or stream) ◀────────┘
//! ```
//!
//! ## Event Loop
//!
//! [`run`] owns the only mutable state: the current `TuiState`, the pending
//! command queue, and the terminal. It waits on four sources at once, in
//! priority order:
//!
//! 1. A chunk of stdin
//! 2. A resize notification
//! 3. Actions coming back from the running command, one per turn
//! 4. Completion of the running command's task
//!
//! Commands run strictly one at a time in arrival order. Keystrokes keep
//! applying their actions while a command runs; any command they produce
//! waits in the queue. Every applied action triggers a full repaint, except
//! that the actions of one key press are applied together and painted once.
//!
//! `Quit` wins over everything: the running command is aborted, queued ones
//! are dropped, and the terminal is put back the way it was found.

pub mod ansi;
pub mod command;
pub mod component;
pub mod components;
pub mod event;
pub mod keymap;
pub mod layout;
pub mod terminal;
pub mod ui;

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::core::action::{Action, Command, reduce};
use crate::core::state::{StateOverrides, TuiState};
use crate::tui::ansi::{cursor, screen};
use crate::tui::keymap::{Binding, default_bindings, resolve};

pub use command::{CommandError, CommandHandler, CommandOutput};
pub use terminal::{MemoryHandle, Terminal};

const READ_BUFFER_SIZE: usize = 4096;
const PANIC_MESSAGE: &str = "command failed unexpectedly";

/// Everything `run` needs besides the terminal and the handler.
pub struct RunOptions {
    pub bindings: Vec<Binding>,
    /// Merged over the default state before the first frame
    pub overrides: StateOverrides,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            bindings: default_bindings(),
            overrides: StateOverrides::default(),
        }
    }
}

/// Messages from a running command task back to the loop.
#[derive(Debug)]
enum CommandEvent {
    Action(Action),
    Failed(CommandError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the interface until the user quits or stdin closes.
///
/// Returns the final state. I/O errors writing to the terminal end the loop
/// early; the terminal is restored either way.
pub async fn run(
    terminal: Terminal,
    handler: Arc<dyn CommandHandler>,
    options: RunOptions,
) -> io::Result<TuiState> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut event_loop = EventLoop {
        terminal,
        handler,
        bindings: options.bindings,
        state: options.overrides.apply(TuiState::default()),
        queue: VecDeque::new(),
        in_flight: None,
        tx,
        rx,
    };

    let result = event_loop.run_until_quit().await;
    event_loop.shutdown();
    result.map(|()| event_loop.state)
}

struct EventLoop {
    terminal: Terminal,
    handler: Arc<dyn CommandHandler>,
    bindings: Vec<Binding>,
    state: TuiState,
    queue: VecDeque<Command>,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<CommandEvent>,
    rx: mpsc::UnboundedReceiver<CommandEvent>,
}

impl EventLoop {
    async fn run_until_quit(&mut self) -> io::Result<()> {
        self.terminal.enable_raw_mode();
        let size = self.terminal.size();
        self.apply(Action::Resize {
            rows: size.rows,
            cols: size.cols,
        });
        self.terminal.write(screen::ALT)?;
        self.repaint()?;
        info!("Event loop started at {}x{}", size.rows, size.cols);

        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            // Stdin outranks command output; a command's events outrank its completion
            tokio::select! {
                biased;

                read = self.terminal.input.read(&mut buf) => {
                    match read {
                        Ok(0) => {
                            info!("stdin closed, quitting");
                            return Ok(());
                        }
                        Ok(n) => {
                            if self.handle_input(&buf[..n])? == Flow::Quit {
                                return Ok(());
                            }
                        }
                        Err(e) => {
                            warn!("stdin read failed, quitting: {}", e);
                            return Ok(());
                        }
                    }
                }
                Some(()) = self.terminal.resize_rx.recv() => {
                    let size = self.terminal.size();
                    debug!("Resize to {}x{}", size.rows, size.cols);
                    self.apply(Action::Resize {
                        rows: size.rows,
                        cols: size.cols,
                    });
                    self.repaint()?;
                }
                Some(event) = self.rx.recv() => {
                    self.handle_command_event(event)?;
                }
                joined = join_in_flight(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.finish_command(joined)?;
                    self.dispatch_next();
                }
            }
        }
    }

    /// Decode, resolve, and apply one stdin chunk. Commands are queued, then dispatched.
    fn handle_input(&mut self, bytes: &[u8]) -> io::Result<Flow> {
        for event in event::decode(bytes) {
            let result = resolve(&event, self.state.mode, &self.bindings);
            if result.is_empty() {
                continue;
            }
            if result.commands.contains(&Command::Quit) {
                info!("Quit requested");
                return Ok(Flow::Quit);
            }

            let selected_before = self.state.selected_chat_id();
            if !result.actions.is_empty() {
                for action in result.actions {
                    self.apply(action);
                }
                self.repaint()?;
            }

            for command in result.commands {
                debug!("Queueing command {:?}", command);
                self.queue.push_back(command);
            }

            let selected_after = self.state.selected_chat_id();
            if selected_after != selected_before {
                if let Some(chat_id) = selected_after {
                    debug!("Selection moved to chat {}, queueing load", chat_id);
                    self.queue.push_back(Command::LoadChat { chat_id });
                }
            }
        }

        self.dispatch_next();
        Ok(Flow::Continue)
    }

    fn handle_command_event(&mut self, event: CommandEvent) -> io::Result<()> {
        match event {
            CommandEvent::Action(action) => self.apply(action),
            CommandEvent::Failed(error) => {
                warn!("Command failed: {}", error);
                self.apply(Action::SetError {
                    error: Some(error.to_string()),
                });
            }
        }
        self.repaint()
    }

    /// Settle a finished command task: flush its last actions, report a panic, drop a stale stream.
    fn finish_command(&mut self, joined: Result<(), JoinError>) -> io::Result<()> {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_command_event(event)?;
        }

        if let Err(e) = joined {
            if e.is_panic() {
                warn!("Command task panicked: {}", e);
                self.apply(Action::SetError {
                    error: Some(PANIC_MESSAGE.to_string()),
                });
                self.repaint()?;
            }
        }

        if self.state.streaming.active {
            debug!("Command ended mid-stream, cancelling stream");
            self.apply(Action::CancelStream);
            self.repaint()?;
        }
        Ok(())
    }

    /// Start the next queued command if nothing is running.
    fn dispatch_next(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(command) = self.queue.pop_front() else {
            return;
        };

        info!("Dispatching command {:?}", command);
        let handler = self.handler.clone();
        let snapshot = self.state.clone();
        let tx = self.tx.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let output = match handler.on_command(&command, &snapshot).await {
                Ok(output) => output,
                Err(e) => {
                    let _ = tx.send(CommandEvent::Failed(e));
                    return;
                }
            };

            let mut actions = output.into_stream();
            let mut delivered = 0usize;
            while let Some(item) = actions.next().await {
                let event = match item {
                    Ok(action) => CommandEvent::Action(action),
                    Err(e) => CommandEvent::Failed(e),
                };
                let failed = matches!(event, CommandEvent::Failed(_));
                if tx.send(event).is_err() {
                    warn!("Event loop gone, dropping output of {:?}", command);
                    return;
                }
                if failed {
                    return;
                }
                delivered += 1;
            }
            debug!("Command {:?} delivered {} actions", command, delivered);
        }));
    }

    fn apply(&mut self, action: Action) {
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string(&action) {
                Ok(json) => debug!("Applying {}", json),
                Err(_) => debug!("Applying {:?}", action),
            }
        }
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    fn repaint(&mut self) -> io::Result<()> {
        let frame = ui::render(&self.state);
        self.terminal.write(&frame)
    }

    /// Abort any running command and hand the terminal back.
    fn shutdown(&mut self) {
        if let Some(task) = self.in_flight.take() {
            info!("Aborting in-flight command");
            task.abort();
        }
        if !self.queue.is_empty() {
            info!("Dropping {} queued commands", self.queue.len());
            self.queue.clear();
        }
        self.terminal.restore_raw_mode();
        let exit = format!("{}{}", screen::MAIN, cursor::SHOW);
        if let Err(e) = self.terminal.write(&exit) {
            warn!("Failed to restore screen: {}", e);
        }
        info!("Event loop stopped");
    }
}

/// Resolves when the running command's task ends; never resolves when idle.
async fn join_in_flight(task: &mut Option<JoinHandle<()>>) -> Result<(), JoinError> {
    match task {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{ChatSummary, Mode};
    use crate::test_support::{RecordingHandler, chats};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_stdin_eof_quits_and_restores() {
        let (terminal, handle) = Terminal::in_memory(tokio::io::empty(), 12, 60);
        let state = run(terminal, Arc::new(RecordingHandler::default()), RunOptions::default())
            .await
            .unwrap();

        assert!(!handle.is_raw());
        let output = handle.output();
        assert!(output.starts_with(screen::ALT));
        assert!(output.ends_with("\x1b[?1049l\x1b[?25h"));
        assert_eq!(state.screen_size.rows, 12);
    }

    #[tokio::test]
    async fn test_overrides_applied_before_first_frame() {
        let (terminal, handle) = Terminal::in_memory(tokio::io::empty(), 12, 60);
        let options = RunOptions {
            overrides: StateOverrides {
                chats: Some(chats(&["Seeded"])),
                mode: Some(Mode::Insert),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = run(terminal, Arc::new(RecordingHandler::default()), options)
            .await
            .unwrap();
        assert_eq!(state.mode, Mode::Insert);
        assert_eq!(
            state.chats,
            vec![ChatSummary {
                id: 1,
                title: "Seeded".to_string()
            }]
        );
        assert!(handle.output().contains("> Seeded"));
    }

    #[tokio::test]
    async fn test_keys_in_one_read_apply_in_order() {
        let (mut client, server) = tokio::io::duplex(64);
        let (terminal, handle) = Terminal::in_memory(server, 12, 60);
        let task = tokio::spawn(run(
            terminal,
            Arc::new(RecordingHandler::default()),
            RunOptions::default(),
        ));

        use tokio::io::AsyncWriteExt;
        client.write_all(b"ihi").await.unwrap();
        assert!(handle.wait_until(WAIT, |h| h.last_frame().contains("> hi")).await);
        drop(client);

        let state = task.await.unwrap().unwrap();
        assert_eq!(state.input_buffer, "hi");
        assert_eq!(state.mode, Mode::Insert);
    }
}
