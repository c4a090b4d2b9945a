//! Adapter implementations for notification ports.

pub mod memory;

mod discord;
mod file;

pub use discord::DiscordChannel;
pub use file::JsonFileHandleStore;
