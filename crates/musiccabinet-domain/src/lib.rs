// Domain layer - Pure business logic
// No dependencies on infrastructure or presentation layers

pub mod album_info;
pub mod library;
pub mod metadata;
pub mod music;
pub mod shared;
pub mod webservice;

// Re-exports for convenience
pub use shared::{DomainError, ErrorCode};
