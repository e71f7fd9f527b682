//! Outbound HTTP client for the chat platform's REST API.

use std::time::Duration;

use aegis_common::config::PlatformConfig;
use aegis_common::{AppError, AppResult};
use aegis_core::{LookupError, MessageLookup, MessageRef, MessageSnapshot, Platform, UserRef};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Message payload returned by the platform API.
#[derive(Debug, Deserialize)]
struct MessagePayload {
    id: u64,
    channel_id: u64,
    guild_id: u64,
    author: AuthorPayload,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AuthorPayload {
    id: u64,
    username: String,
}

/// Payload of a freshly created message.
#[derive(Debug, Deserialize)]
struct CreatedMessagePayload {
    id: u64,
}

/// Error body returned by the platform API.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
}

/// Reqwest-backed [`Platform`] implementation.
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    http_client: Client,
    api_url: String,
    token: String,
}

impl HttpPlatform {
    /// Create a client with a bounded request timeout.
    pub fn new(config: &PlatformConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Platform(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }
}

#[async_trait]
impl MessageLookup for HttpPlatform {
    async fn fetch_message(&self, message: &MessageRef) -> Result<MessageSnapshot, LookupError> {
        let url = format!(
            "{}/guilds/{}/channels/{}/messages/{}",
            self.api_url, message.guild_id, message.channel_id, message.message_id
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| LookupError::Platform(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            // The error code distinguishes which part of the reference is gone
            let code = response
                .json::<ErrorPayload>()
                .await
                .map(|payload| payload.error.code)
                .unwrap_or_default();
            return Err(match code.as_str() {
                "UNKNOWN_GUILD" => LookupError::GuildUnavailable,
                "UNKNOWN_CHANNEL" => LookupError::ChannelNotFound,
                _ => LookupError::MessageNotFound,
            });
        }
        if !response.status().is_success() {
            return Err(LookupError::Platform(format!(
                "platform returned status {}",
                response.status()
            )));
        }

        let payload: MessagePayload = response
            .json()
            .await
            .map_err(|e| LookupError::Platform(e.to_string()))?;

        debug!(message_id = payload.id, "Fetched message from platform");
        Ok(MessageSnapshot {
            message: MessageRef {
                guild_id: payload.guild_id,
                channel_id: payload.channel_id,
                message_id: payload.id,
            },
            author: UserRef {
                id: payload.author.id,
                username: payload.author.username,
            },
            content: payload.content,
        })
    }
}

#[async_trait]
impl Platform for HttpPlatform {
    async fn send_direct_message(&self, user_id: u64, text: &str) -> AppResult<()> {
        let url = format!("{}/users/{user_id}/messages", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| AppError::Platform(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Platform(format!(
                "direct message send returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn post_to_channel(&self, channel_id: u64, text: &str) -> AppResult<u64> {
        let url = format!("{}/channels/{channel_id}/messages", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| AppError::Platform(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Platform(format!(
                "channel post returned status {}",
                response.status()
            )));
        }

        let payload: CreatedMessagePayload = response
            .json()
            .await
            .map_err(|e| AppError::Platform(e.to_string()))?;
        Ok(payload.id)
    }
}
