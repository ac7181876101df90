//! Infrastructure layer for Clauseguard.
//!
//! Concrete persistence adapters, path resolution, configuration loading and
//! tracing setup.

pub mod config_service;
pub mod file_state_store;
pub mod memory_state_store;
pub mod paths;
pub mod storage;
pub mod telemetry;
pub mod tiered_state_store;

pub use crate::config_service::ConfigService;
pub use crate::file_state_store::FileStateStore;
pub use crate::memory_state_store::MemoryStateStore;
pub use crate::paths::ClauseguardPaths;
pub use crate::telemetry::init_tracing;
pub use crate::tiered_state_store::TieredStateStore;
