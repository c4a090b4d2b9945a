//! Discord gateway listener for slash command invocations.

use crate::command::domain::CommandInvocation;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twilight_gateway::{Event, EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_model::application::interaction::{Interaction, InteractionData};

/// Receives interactions over a single gateway shard.
///
/// Slash commands need no privileged intents, so the shard subscribes to
/// none and only asks for interaction events.
pub struct DiscordGateway {
    token: String,
}

impl std::fmt::Debug for DiscordGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordGateway").finish_non_exhaustive()
    }
}

impl DiscordGateway {
    /// Creates a listener authenticated with a bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Forwards command invocations until cancelled or the receiver closes.
    ///
    /// Receive errors are logged and skipped; the shard reconnects by itself.
    pub async fn listen(
        self,
        invocations: UnboundedSender<CommandInvocation>,
        cancel: CancellationToken,
    ) {
        let mut shard = Shard::new(ShardId::ONE, self.token, Intents::empty());
        info!("listening for slash commands");
        loop {
            let item = tokio::select! {
                () = cancel.cancelled() => break,
                item = shard.next_event(EventTypeFlags::INTERACTION_CREATE) => item,
            };
            let Some(item) = item else {
                break;
            };
            let event = match item {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "could not receive gateway event");
                    continue;
                }
            };
            let Event::InteractionCreate(created) = event else {
                continue;
            };
            let Some(invocation) = invocation_from(&created) else {
                continue;
            };
            debug!(?invocation, "received command");
            if invocations.send(invocation).is_err() {
                break;
            }
        }
        debug!("gateway listener stopped");
    }
}

fn invocation_from(interaction: &Interaction) -> Option<CommandInvocation> {
    let Some(InteractionData::ApplicationCommand(data)) = &interaction.data else {
        return None;
    };
    Some(CommandInvocation::new(
        interaction.id.to_string(),
        interaction.token.clone(),
        data.name.clone(),
    ))
}
