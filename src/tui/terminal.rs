//! The terminal as a single owned handle.
//!
//! A `Terminal` bundles the byte input, the output sink, the size query,
//! raw-mode control, and a resize notification channel. The event loop owns
//! it for its whole run. Two backends exist:
//!
//! - [`Terminal::stdio`]: the real process stdin/stdout, raw mode via crossterm,
//!   and a background task that polls the window size.
//! - [`Terminal::in_memory`]: any `AsyncRead` as input, output captured in a
//!   buffer, size and resizes driven through a [`MemoryHandle`].
//!
//! Raw mode is restored on drop, so an early return or panic in the loop
//! still leaves the terminal usable.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::state::ScreenSize;

enum Device {
    Tty,
    Memory(Arc<MemoryState>),
}

pub struct Terminal {
    pub(crate) input: Box<dyn AsyncRead + Send + Unpin>,
    output: Box<dyn Write + Send>,
    device: Device,
    pub(crate) resize_rx: mpsc::UnboundedReceiver<()>,
    // Held so `resize_rx` never reports a closed channel
    _resize_tx: mpsc::UnboundedSender<()>,
    /// Raw-mode state before we enabled it; `Some` while we owe a restore
    raw_before: Option<bool>,
    watcher: Option<JoinHandle<()>>,
}

impl Terminal {
    /// The process terminal. Must be called inside a tokio runtime.
    pub fn stdio(resize_poll_ms: u64) -> Self {
        let (resize_tx, resize_rx) = mpsc::unbounded_channel();
        let watcher = tokio::spawn(watch_size(
            Duration::from_millis(resize_poll_ms.max(1)),
            resize_tx.clone(),
        ));

        Self {
            input: Box::new(tokio::io::stdin()),
            output: Box::new(io::stdout()),
            device: Device::Tty,
            resize_rx,
            _resize_tx: resize_tx,
            raw_before: None,
            watcher: Some(watcher),
        }
    }

    /// A terminal backed by `input` and an in-memory screen of `rows` x `cols`.
    pub fn in_memory(
        input: impl AsyncRead + Send + Unpin + 'static,
        rows: u16,
        cols: u16,
    ) -> (Self, MemoryHandle) {
        let state = Arc::new(MemoryState {
            size: Mutex::new(ScreenSize { rows, cols }),
            raw: AtomicBool::new(false),
            output: Mutex::new(Vec::new()),
        });
        let (resize_tx, resize_rx) = mpsc::unbounded_channel();

        let terminal = Self {
            input: Box::new(input),
            output: Box::new(MemoryWriter(state.clone())),
            device: Device::Memory(state.clone()),
            resize_rx,
            _resize_tx: resize_tx.clone(),
            raw_before: None,
            watcher: None,
        };
        let handle = MemoryHandle { state, resize_tx };
        (terminal, handle)
    }

    pub fn size(&self) -> ScreenSize {
        match &self.device {
            Device::Tty => match crossterm::terminal::size() {
                Ok((cols, rows)) => ScreenSize { rows, cols },
                Err(e) => {
                    warn!("Could not read terminal size, assuming 24x80: {}", e);
                    ScreenSize::default()
                }
            },
            Device::Memory(state) => state.size(),
        }
    }

    /// Enter raw mode, remembering the prior state. Failure is logged, not fatal.
    pub fn enable_raw_mode(&mut self) {
        match &self.device {
            Device::Tty => {
                if !io::stdin().is_terminal() {
                    info!("stdin is not a TTY, running without raw mode");
                    return;
                }
                let was_raw = crossterm::terminal::is_raw_mode_enabled().unwrap_or(false);
                if !was_raw {
                    if let Err(e) = crossterm::terminal::enable_raw_mode() {
                        warn!("Raw mode unavailable, continuing without it: {}", e);
                        return;
                    }
                }
                self.raw_before = Some(was_raw);
            }
            Device::Memory(state) => {
                let was_raw = state.raw.swap(true, Ordering::SeqCst);
                self.raw_before = Some(was_raw);
            }
        }
        debug!("Raw mode enabled (previously {:?})", self.raw_before);
    }

    /// Put raw mode back the way `enable_raw_mode` found it. Idempotent.
    pub fn restore_raw_mode(&mut self) {
        let Some(was_raw) = self.raw_before.take() else {
            return;
        };
        if was_raw {
            return;
        }
        match &self.device {
            Device::Tty => {
                if let Err(e) = crossterm::terminal::disable_raw_mode() {
                    warn!("Failed to restore terminal mode: {}", e);
                }
            }
            Device::Memory(state) => state.raw.store(false, Ordering::SeqCst),
        }
        debug!("Raw mode restored");
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.restore_raw_mode();
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// Poll the window size and send a notification whenever it changes.
async fn watch_size(period: Duration, tx: mpsc::UnboundedSender<()>) {
    let mut last = crossterm::terminal::size().ok();
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let current = crossterm::terminal::size().ok();
        if current != last {
            debug!("Terminal size changed: {:?} -> {:?}", last, current);
            last = current;
            if tx.send(()).is_err() {
                return;
            }
        }
    }
}

struct MemoryState {
    size: Mutex<ScreenSize>,
    raw: AtomicBool,
    output: Mutex<Vec<u8>>,
}

impl MemoryState {
    fn size(&self) -> ScreenSize {
        self.size.lock().map(|s| *s).unwrap_or_default()
    }
}

struct MemoryWriter(Arc<MemoryState>);

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut output = self
            .0
            .output
            .lock()
            .map_err(|_| io::Error::other("output buffer poisoned"))?;
        output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Test-side view of an in-memory terminal.
#[derive(Clone)]
pub struct MemoryHandle {
    state: Arc<MemoryState>,
    resize_tx: mpsc::UnboundedSender<()>,
}

/// Marks the start of every full repaint.
const FRAME_START: &str = "\x1b[?25l\x1b[H\x1b[2J";

impl MemoryHandle {
    /// Everything written so far.
    pub fn output(&self) -> String {
        match self.state.output.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }

    /// The most recent full frame, or an empty string before the first one.
    pub fn last_frame(&self) -> String {
        let output = self.output();
        match output.rfind(FRAME_START) {
            Some(start) => output[start..].to_string(),
            None => String::new(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.output().matches(FRAME_START).count()
    }

    pub fn is_raw(&self) -> bool {
        self.state.raw.load(Ordering::SeqCst)
    }

    /// Change the screen size and notify the loop, like a window resize would.
    pub fn resize(&self, rows: u16, cols: u16) {
        if let Ok(mut size) = self.state.size.lock() {
            *size = ScreenSize { rows, cols };
        }
        let _ = self.resize_tx.send(());
    }

    /// Wait until `condition` holds, polling every few milliseconds. Gives up after `timeout`.
    pub async fn wait_until(
        &self,
        timeout: Duration,
        condition: impl Fn(&MemoryHandle) -> bool,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if condition(self) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_raw_mode_round_trip() {
        let (mut terminal, handle) = Terminal::in_memory(tokio::io::empty(), 10, 40);
        assert!(!handle.is_raw());
        terminal.enable_raw_mode();
        assert!(handle.is_raw());
        terminal.restore_raw_mode();
        assert!(!handle.is_raw());
        // Second restore is a no-op
        terminal.restore_raw_mode();
        assert!(!handle.is_raw());
    }

    #[tokio::test]
    async fn test_drop_restores_raw_mode() {
        let (mut terminal, handle) = Terminal::in_memory(tokio::io::empty(), 10, 40);
        terminal.enable_raw_mode();
        drop(terminal);
        assert!(!handle.is_raw());
    }

    #[tokio::test]
    async fn test_already_raw_stays_raw() {
        let (mut terminal, handle) = Terminal::in_memory(tokio::io::empty(), 10, 40);
        handle.state.raw.store(true, Ordering::SeqCst);
        terminal.enable_raw_mode();
        terminal.restore_raw_mode();
        assert!(handle.is_raw());
    }

    #[tokio::test]
    async fn test_resize_updates_size_and_notifies() {
        let (mut terminal, handle) = Terminal::in_memory(tokio::io::empty(), 10, 40);
        assert_eq!(terminal.size(), ScreenSize { rows: 10, cols: 40 });
        handle.resize(30, 100);
        assert_eq!(terminal.size(), ScreenSize { rows: 30, cols: 100 });
        assert_eq!(terminal.resize_rx.recv().await, Some(()));
    }

    #[tokio::test]
    async fn test_output_and_frames() {
        let (mut terminal, handle) = Terminal::in_memory(tokio::io::empty(), 10, 40);
        terminal.write("prefix").unwrap();
        terminal.write(&format!("{FRAME_START}one")).unwrap();
        terminal.write(&format!("{FRAME_START}two")).unwrap();
        assert_eq!(handle.frame_count(), 2);
        assert_eq!(handle.last_frame(), format!("{FRAME_START}two"));
        assert!(handle.output().starts_with("prefix"));
    }
}
