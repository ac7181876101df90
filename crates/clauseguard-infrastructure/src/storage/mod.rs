//! Storage layer for atomic file operations.

mod state_file;

pub use state_file::{StateFile, StateTable};
