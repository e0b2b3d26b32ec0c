// Ollama model implementation - local `/api/chat` endpoint
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::chat::ChatModel;
use super::message::{ChatMessage, Role};
use crate::core::{BoxFuture, Runnable};
use crate::error::RelayError;

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaWireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaWireMessage>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct OllamaModel {
    client: Client,
    base_url: String,
    model_name: String,
}

impl OllamaModel {
    pub fn new(base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.into(),
        }
    }
}

impl ChatModel for OllamaModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<ChatMessage, RelayError>> {
        Box::pin(async move {
            let api_url = format!("{}/api/chat", self.base_url);
            debug!("POST {} (model={})", api_url, self.model_name);

            let body = OllamaChatRequest {
                model: &self.model_name,
                messages: &messages,
                stream: false,
            };
            let response = self.client.post(&api_url).json(&body).send().await?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await?;
                return Err(RelayError::Backend(format!(
                    "ollama request failed: {} - {}",
                    status, error_text
                )));
            }

            let reply: OllamaChatResponse = response
                .json()
                .await
                .map_err(|e| RelayError::Backend(format!("unreadable ollama reply: {}", e)))?;

            match (reply.message, reply.error) {
                (Some(message), _) => Ok(ChatMessage::new(Role::from_wire(&message.role), message.content)),
                (None, Some(error)) => Err(RelayError::Backend(error)),
                (None, None) => Err(RelayError::Backend("ollama reply has no message".to_string())),
            }
        })
    }
}

impl Runnable<Vec<ChatMessage>, ChatMessage> for OllamaModel {
    fn invoke(&self, input: Vec<ChatMessage>) -> BoxFuture<'_, Result<ChatMessage, RelayError>> {
        self.generate(input)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
