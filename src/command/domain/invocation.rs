//! Slash commands and their invocations.

use std::fmt;

/// Commands the bot registers with the chat service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlashCommand {
    /// Starts the game server.
    Start,
}

impl SlashCommand {
    /// Every registered command.
    pub const ALL: [Self; 1] = [Self::Start];

    /// Resolves a command from its registered name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    /// Returns the registered name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
        }
    }

    /// Returns the description shown in the command picker.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Start => "Start the game server",
        }
    }
}

impl fmt::Display for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// One command invocation received from the chat service.
///
/// The identifier and token address the reply; the token is never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    id: String,
    token: String,
    name: String,
}

impl CommandInvocation {
    /// Creates an invocation of the command registered as `name`.
    pub fn new(id: impl Into<String>, token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            name: name.into(),
        }
    }

    /// Returns the interaction identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the reply token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the invoked command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the command, if it is one the bot registered.
    #[must_use]
    pub fn command(&self) -> Option<SlashCommand> {
        SlashCommand::from_name(&self.name)
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immediate answer to an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    content: String,
    ephemeral: bool,
}

impl CommandReply {
    /// Creates a reply only the invoking user can see.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }

    /// Returns the reply text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns whether only the invoking user sees the reply.
    #[must_use]
    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}
