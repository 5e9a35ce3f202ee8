//! # TUI Components
//!
//! The pieces of a frame. Each one draws a single screen region into a
//! [`Frame`](crate::tui::component::Frame).
//!
//! ## Component Architecture
//!
//! All components are stateless with respect to the app: they receive their
//! data as props borrowed from `TuiState` and are rebuilt every frame.
//! `InputBox` is the one that reports something back (the cursor position).
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── status_bar.rs    (mode, focus, streaming indicator)
//! ├── chat_list.rs     (left panel)
//! ├── message_list.rs  (right panel, streaming row, error overlay)
//! ├── input_box/       (prompt + horizontally scrolled buffer)
//! └── help.rs          (keybinding overlay)
//! ```

mod chat_list;
mod help;
pub mod input_box;
mod message_list;
mod status_bar;

pub use chat_list::ChatList;
pub use help::HelpOverlay;
pub use input_box::InputBox;
pub use message_list::MessageList;
pub use status_bar::StatusBar;
