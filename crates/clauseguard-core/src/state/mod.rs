//! Persisted engine state: keys, preference types and the storage trait.

pub mod model;
pub mod repository;

pub use model::{SESSION_ID_KEY, USER_ROLE_KEY, UserRole};
pub use repository::PersistenceAdapter;
