//! Command domain types.

mod invocation;

pub use invocation::{CommandInvocation, CommandReply, SlashCommand};
