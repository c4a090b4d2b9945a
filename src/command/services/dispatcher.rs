//! Routes command invocations to the monitor.

use crate::command::{
    domain::{CommandInvocation, CommandReply, SlashCommand},
    ports::{InteractionResponder, InteractionResult, StartTrigger},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const START_ACK: &str = "Start request received. Progress is posted in the channel.";

/// What happened to one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The start request was acknowledged and queued.
    StartQueued,
    /// The acknowledgement failed, so nothing was queued.
    Unacknowledged,
    /// The acknowledgement went out but the monitor had shut down.
    MonitorGone,
    /// The command is not one the bot registered.
    Ignored,
}

/// Acknowledges invocations, then acts on them.
///
/// Acknowledgement comes first because the chat service only waits a few
/// seconds for it; the start itself runs on the monitor and reports its own
/// progress.
pub struct CommandDispatcher<R, T>
where
    R: InteractionResponder,
    T: StartTrigger,
{
    responder: Arc<R>,
    trigger: Arc<T>,
}

impl<R, T> CommandDispatcher<R, T>
where
    R: InteractionResponder,
    T: StartTrigger,
{
    /// Creates a dispatcher replying through `responder`.
    #[must_use]
    pub const fn new(responder: Arc<R>, trigger: Arc<T>) -> Self {
        Self { responder, trigger }
    }

    /// Registers every command the dispatcher handles.
    ///
    /// # Errors
    ///
    /// Returns the responder's error when registration fails.
    pub async fn register(&self) -> InteractionResult<()> {
        self.responder.register(&SlashCommand::ALL).await?;
        info!(count = SlashCommand::ALL.len(), "registered slash commands");
        Ok(())
    }

    /// Handles one invocation.
    pub async fn dispatch(&self, invocation: &CommandInvocation) -> DispatchOutcome {
        let Some(command) = invocation.command() else {
            debug!(name = invocation.name(), "ignoring unknown command");
            return DispatchOutcome::Ignored;
        };
        match command {
            SlashCommand::Start => self.start(invocation).await,
        }
    }

    /// Handles invocations until the sending side closes.
    pub async fn serve(&self, mut invocations: mpsc::UnboundedReceiver<CommandInvocation>) {
        while let Some(invocation) = invocations.recv().await {
            self.dispatch(&invocation).await;
        }
        debug!("command dispatcher stopped");
    }

    async fn start(&self, invocation: &CommandInvocation) -> DispatchOutcome {
        info!(interaction_id = invocation.id(), "start requested by command");
        let reply = CommandReply::ephemeral(START_ACK);
        if let Err(err) = self.responder.respond(invocation, &reply).await {
            warn!(interaction_id = invocation.id(), error = %err, "could not acknowledge command");
            return DispatchOutcome::Unacknowledged;
        }
        match self.trigger.request_start() {
            Ok(()) => DispatchOutcome::StartQueued,
            Err(err) => {
                warn!(error = %err, "could not queue start request");
                DispatchOutcome::MonitorGone
            }
        }
    }
}
