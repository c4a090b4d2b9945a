//! Adapter implementations for command ports.

mod discord;
mod gateway;
mod trigger;

pub use discord::DiscordInteractions;
pub use gateway::DiscordGateway;
