//! Artistry Hub Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod postal;
pub mod server;
pub mod social;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use postal::{HttpPostalClient, NoOpPostalLookup, PostalLookup};
pub use server::{run_server, RequestsLoggingLevel};
pub use social::{SocialStore, SqliteSocialStore};
pub use user::{SqliteUserStore, UserManager, UserRole, UserStore};
