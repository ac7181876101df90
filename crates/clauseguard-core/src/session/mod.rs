//! Session domain module.
//!
//! This module contains the session and term domain models.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`) and generated-document descriptors
//! - `term`: Contract clause model (`Term`) and its mutation rules

mod model;
mod term;

// Re-export public API
pub use model::{ContractArtifacts, DetectedLanguage, RemoteFile, Session};
pub use term::Term;
