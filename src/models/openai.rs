// OpenAI model implementation - chat completions API
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::chat::ChatModel;
use super::message::{ChatMessage, Role};
use crate::core::{BoxFuture, Runnable};
use crate::error::RelayError;

#[derive(Serialize, Deserialize, Clone)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

// OpenAI-compatible chat model
#[derive(Clone)]
pub struct OpenAIChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    model_name: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAIChatModel {
    /// Create a new OpenAI chat model instance
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: "gpt-3.5-turbo".to_string(),
            temperature: Some(0.7),
            max_tokens: None,
        }
    }

    /// Set model name
    pub fn with_model(mut self, model_name: String) -> Self {
        self.model_name = model_name;
        self
    }

    /// Set temperature parameter
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set maximum number of tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn request_body(&self, messages: Vec<ChatMessage>) -> serde_json::Value {
        let openai_messages: Vec<OpenAIMessage> = messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect();

        let mut request_body = serde_json::json!({
            "messages": openai_messages,
            "model": self.model_name,
        });

        // Add optional parameters
        if let Some(temp) = self.temperature {
            request_body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = self.max_tokens {
            request_body["max_tokens"] = serde_json::json!(max);
        }
        request_body
    }
}

impl ChatModel for OpenAIChatModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<ChatMessage, RelayError>> {
        Box::pin(async move {
            let request_body = self.request_body(messages);

            // Build complete API path, concatenating base_url with specific endpoint
            let api_url = format!("{}/chat/completions", self.base_url);
            debug!("POST {} (model={})", api_url, self.model_name);

            let response = self
                .client
                .post(&api_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request_body)
                .send()
                .await?;

            // Check response status
            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await?;
                return Err(RelayError::Backend(format!("API request failed: {} - {}", status, error_text)));
            }

            let response: OpenAIResponse = response
                .json()
                .await
                .map_err(|e| RelayError::Backend(format!("unreadable completion: {}", e)))?;

            if let Some(usage) = &response.usage {
                info!(
                    "{} usage: prompt={} completion={} total={}",
                    response.model.as_deref().unwrap_or("unknown"),
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.total_tokens
                );
            }

            match response.choices.into_iter().next() {
                Some(choice) => Ok(ChatMessage::new(
                    Role::from_wire(&choice.message.role),
                    choice.message.content,
                )),
                None => Err(RelayError::Backend("No choices returned from API".to_string())),
            }
        })
    }
}

impl Runnable<Vec<ChatMessage>, ChatMessage> for OpenAIChatModel {
    fn invoke(&self, input: Vec<ChatMessage>) -> BoxFuture<'_, Result<ChatMessage, RelayError>> {
        self.generate(input)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
