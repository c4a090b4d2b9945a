//! Discord REST adapter for the notification channel port.

use crate::notification::{
    domain::MessageId,
    ports::{NotificationChannel, NotificationChannelError, NotificationChannelResult},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_ERROR_BODY: usize = 512;

/// Posts and edits messages in a single Discord text channel.
#[derive(Clone)]
pub struct DiscordChannel {
    client: reqwest::Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl std::fmt::Debug for DiscordChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordChannel")
            .field("api_base", &self.api_base)
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    id: String,
}

impl DiscordChannel {
    /// Creates an adapter for `channel_id` authenticated with a bot token.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationChannelError::Transport`] when the HTTP client
    /// cannot be built.
    pub fn new(
        token: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> NotificationChannelResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NotificationChannelError::transport)?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_owned(),
            token: token.into(),
            channel_id: channel_id.into(),
        })
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}

async fn rejection(response: reqwest::Response) -> NotificationChannelError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    NotificationChannelError::Rejected {
        status,
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

#[async_trait]
impl NotificationChannel for DiscordChannel {
    async fn create(&self, content: &str) -> NotificationChannelResult<MessageId> {
        debug!(channel_id = %self.channel_id, "creating message");
        let response = self
            .client
            .post(self.messages_url())
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&MessageBody { content })
            .send()
            .await
            .map_err(NotificationChannelError::transport)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let created: MessageResponse = response
            .json()
            .await
            .map_err(|err| NotificationChannelError::InvalidResponse(err.to_string()))?;
        MessageId::new(created.id).ok_or_else(|| {
            NotificationChannelError::InvalidResponse("message id is blank".to_owned())
        })
    }

    async fn edit(&self, id: &MessageId, content: &str) -> NotificationChannelResult<()> {
        debug!(channel_id = %self.channel_id, message_id = %id, "editing message");
        let response = self
            .client
            .patch(format!("{}/{id}", self.messages_url()))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&MessageBody { content })
            .send()
            .await
            .map_err(NotificationChannelError::transport)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(NotificationChannelError::NotFound(id.clone())),
            _ => Err(rejection(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_uses_channel_and_trimmed_base() {
        let channel = DiscordChannel::new("token", "1234")
            .expect("client should build")
            .with_api_base("http://localhost:9000/api/");

        assert_eq!(
            channel.messages_url(),
            "http://localhost:9000/api/channels/1234/messages"
        );
        assert_eq!(channel.authorization(), "Bot token");
    }
}
