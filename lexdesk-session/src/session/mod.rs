//! Session Management Module
//!
//! The client-side record of who is logged in and with what credential,
//! persisted to durable storage and rehydrated on start.

pub mod storage;
pub mod store;
pub mod types;

pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::{SessionContext, SessionStore};
pub use types::*;
