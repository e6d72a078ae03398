//! Conversation store implementations for agentic.

pub mod file_backend;
pub mod in_memory;
pub mod locks;
pub mod noop;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_backend::FileConversationStore;
pub use in_memory::InMemoryConversationStore;
pub use locks::SessionLocks;
pub use noop::NullConversationStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConversationStore;
