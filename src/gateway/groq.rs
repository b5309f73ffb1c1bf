//! Groq client for the Llama surface.
//!
//! Groq exposes an OpenAI-compatible API, so requests go through async-openai
//! pointed at Groq's base URL.

use super::ChatModel;
use crate::config::{GroqSettings, DEFAULT_SYSTEM_PROMPT};
use crate::error::{HubError, Result};
use crate::session::{ChatMessage, Role};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Llama chat via Groq.
pub struct GroqClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl GroqClient {
    pub fn new(http: reqwest::Client, api_key: &str, settings: &GroqSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(&settings.api_base)
            .with_api_key(api_key);

        // One attempt per request: async-openai would otherwise retry rate limits.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(config)
                .with_http_client(http)
                .with_backoff(no_retry),
            model: settings.model.clone(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system message sent ahead of every conversation.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    fn build_messages(
        &self,
        history: &[ChatMessage],
        new_prompt: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(system_message(&self.system_prompt)?);

        for message in history {
            messages.push(match message.role() {
                Role::System => system_message(message.text())?,
                Role::User => user_message(message.text())?,
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.text())
                    .build()
                    .map_err(request_error)?
                    .into(),
            });
        }

        messages.push(user_message(new_prompt)?);
        Ok(messages)
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    #[instrument(skip_all, fields(model = %self.model, history = history.len()))]
    async fn completion(&self, history: &[ChatMessage], new_prompt: &str) -> Result<String> {
        let messages = self.build_messages(history, new_prompt)?;
        debug!("Sending {} messages", messages.len());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(request_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| HubError::Upstream(format!("Groq chat API error: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| HubError::Upstream("Empty response from Groq".to_string()))
    }
}

fn system_message(text: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(text)
        .build()
        .map_err(request_error)?
        .into())
}

fn user_message(text: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(text)
        .build()
        .map_err(request_error)?
        .into())
}

fn request_error(err: OpenAIError) -> HubError {
    HubError::InvalidInput(format!("Failed to build chat request: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> GroqClient {
        let settings = GroqSettings {
            api_base: server.url(),
            ..GroqSettings::default()
        };
        let http = super::super::http_client(Duration::from_secs(5)).unwrap();
        GroqClient::new(http, "gsk-test", &settings)
    }

    fn completion_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "llama-3.1-8b-instant",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_completion_sends_system_history_and_prompt_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    { "role": "system", "content": "You are a helpful assistant" },
                    { "role": "user", "content": "Hi" },
                    { "role": "assistant", "content": "Hello!" },
                    { "role": "user", "content": "Tell me a joke" }
                ]
            })))
            .with_body(completion_body("ok"))
            .create_async()
            .await;

        let history = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello!")];
        let answer = client(&server)
            .completion(&history, "Tell me a joke")
            .await
            .unwrap();

        assert_eq!(answer, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_custom_system_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    { "role": "system", "content": "Answer in French" },
                    { "role": "user", "content": "Hi" }
                ]
            })))
            .with_body(completion_body("Salut"))
            .create_async()
            .await;

        let answer = client(&server)
            .with_system_prompt("Answer in French")
            .completion(&[], "Hi")
            .await
            .unwrap();

        assert_eq!(answer, "Salut");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auth_failure_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server).completion(&[], "Hi").await.unwrap_err();
        assert!(matches!(err, HubError::Upstream(msg) if msg.contains("Invalid API Key")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_choice_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_body(completion_body(""))
            .create_async()
            .await;

        let err = client(&server).completion(&[], "Hi").await.unwrap_err();
        assert!(matches!(err, HubError::Upstream(_)));
    }
}
