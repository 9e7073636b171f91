//! Conversation core: resolve a thread, append messages, synthesize agent
//! replies, and the catalogue/user administration around them. All storage
//! goes through [`ChatRepository`].

pub mod appender;
pub mod catalogue;
pub mod error;
pub mod exchange;
pub mod history;
pub mod memory;
pub mod repository;
pub mod resolver;
pub mod responder;
pub mod transcript;
pub mod users;

pub use error::{ChatError, Result};
pub use exchange::send_to_agent;
pub use memory::MemoryRepository;
pub use repository::ChatRepository;
