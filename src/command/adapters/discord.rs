//! Discord REST adapter for command registration and replies.

use crate::command::{
    domain::{CommandInvocation, CommandReply, SlashCommand},
    ports::{InteractionError, InteractionResponder, InteractionResult},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_ERROR_BODY: usize = 512;
const CHAT_INPUT: u8 = 1;
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
const EPHEMERAL: u64 = 1 << 6;

/// Registers application commands and answers interactions over REST.
pub struct DiscordInteractions {
    client: reqwest::Client,
    api_base: String,
    token: String,
    application_id: OnceCell<String>,
}

impl std::fmt::Debug for DiscordInteractions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordInteractions")
            .field("api_base", &self.api_base)
            .field("application_id", &self.application_id.get())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct CommandBody {
    name: &'static str,
    description: &'static str,
    #[serde(rename = "type")]
    kind: u8,
}

impl From<SlashCommand> for CommandBody {
    fn from(command: SlashCommand) -> Self {
        Self {
            name: command.name(),
            description: command.description(),
            kind: CHAT_INPUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct CallbackBody<'a> {
    #[serde(rename = "type")]
    kind: u8,
    data: CallbackData<'a>,
}

#[derive(Debug, Serialize)]
struct CallbackData<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<u64>,
}

impl<'a> From<&'a CommandReply> for CallbackBody<'a> {
    fn from(reply: &'a CommandReply) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: CallbackData {
                content: reply.content(),
                flags: reply.is_ephemeral().then_some(EPHEMERAL),
            },
        }
    }
}

#[derive(Deserialize)]
struct ApplicationResponse {
    id: String,
}

impl DiscordInteractions {
    /// Creates an adapter authenticated with a bot token.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(token: impl Into<String>) -> InteractionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(InteractionError::transport)?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_owned(),
            token: token.into(),
            application_id: OnceCell::new(),
        })
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    fn callback_url(&self, invocation: &CommandInvocation) -> String {
        format!(
            "{}/interactions/{}/{}/callback",
            self.api_base,
            invocation.id(),
            invocation.token()
        )
    }

    fn commands_url(&self, application_id: &str) -> String {
        format!("{}/applications/{application_id}/commands", self.api_base)
    }

    async fn application_id(&self) -> InteractionResult<&str> {
        let id = self
            .application_id
            .get_or_try_init(|| async {
                debug!("looking up application id");
                let response = self
                    .client
                    .get(format!("{}/applications/@me", self.api_base))
                    .header(reqwest::header::AUTHORIZATION, self.authorization())
                    .send()
                    .await
                    .map_err(InteractionError::transport)?;
                if !response.status().is_success() {
                    return Err(rejection(response).await);
                }
                let application: ApplicationResponse = response
                    .json()
                    .await
                    .map_err(|err| InteractionError::InvalidResponse(err.to_string()))?;
                Ok::<_, InteractionError>(application.id)
            })
            .await?;
        Ok(id)
    }
}

async fn rejection(response: reqwest::Response) -> InteractionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    InteractionError::Rejected {
        status,
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

#[async_trait]
impl InteractionResponder for DiscordInteractions {
    async fn register(&self, commands: &[SlashCommand]) -> InteractionResult<()> {
        let application_id = self.application_id().await?;
        let body: Vec<CommandBody> = commands.iter().copied().map(CommandBody::from).collect();
        debug!(application_id, count = body.len(), "overwriting application commands");
        let response = self
            .client
            .put(self.commands_url(application_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await
            .map_err(InteractionError::transport)?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }

    async fn respond(
        &self,
        invocation: &CommandInvocation,
        reply: &CommandReply,
    ) -> InteractionResult<()> {
        debug!(interaction_id = invocation.id(), "answering interaction");
        let response = self
            .client
            .post(self.callback_url(invocation))
            .json(&CallbackBody::from(reply))
            .send()
            .await
            .map_err(InteractionError::transport)?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
