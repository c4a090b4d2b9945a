//! In-memory lifecycle adapters for tests and dry runs.

mod game_server;

pub use game_server::InMemoryGameServer;
