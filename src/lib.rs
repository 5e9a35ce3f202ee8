//! Parley library exports: the UI core, the terminal adapter, and a demo chat backend

pub mod core;
pub mod demo;
pub mod tui;

#[cfg(test)]
pub mod test_support;
