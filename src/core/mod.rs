//! # Core Application Logic
//!
//! The UI model of Parley: what the screen is showing and how it changes.
//! It knows nothing about terminals, escape codes, or async I/O.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • TuiState (snapshot)  │
//!                    │  • Action / Command     │
//!                    │  • reduce() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                ┌───────────────┴───────────────┐
//!                ▼                               ▼
//!         ┌────────────┐                  ┌────────────┐
//!         │    TUI     │                  │  Command   │
//!         │  Adapter   │                  │  handlers  │
//!         │ (raw ANSI) │                  │ (demo, db) │
//!         └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `TuiState` struct, all UI state in one place
//! - [`action`]: `Action`, `Command`, and the `reduce()` reducer
//! - [`config`]: TOML configuration with env/CLI overrides

pub mod action;
pub mod config;
pub mod state;
