//! Domain Layer
//!
//! Contains entities, value objects, policy functions, repository traits,
//! and the token codec.

pub mod entity;
pub mod policy;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{account::Account, credentials::Credentials};
pub use repository::{AccountRepository, CredentialsRepository};
