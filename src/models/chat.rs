// Chat model interface and output parser
use crate::core::{BoxFuture, Runnable};
use crate::error::RelayError;
use crate::models::message::ChatMessage;

// Chat model interface
pub trait ChatModel: Send + Sync {
    // Basic model information
    fn model_name(&self) -> &str;

    // Model base URL
    fn base_url(&self) -> &str;

    // Core method: send the conversation, get the assistant reply
    fn generate(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<ChatMessage, RelayError>>;
}

// Reduces a model reply to its text content
#[derive(Clone, Copy, Debug, Default)]
pub struct StrOutputParser;

impl Runnable<ChatMessage, String> for StrOutputParser {
    fn invoke(&self, input: ChatMessage) -> BoxFuture<'_, Result<String, RelayError>> {
        Box::pin(async move { Ok(input.content) })
    }

    fn name(&self) -> &str {
        "StrOutputParser"
    }
}
