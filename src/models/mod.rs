// Model module definition
mod chat;
mod message;
mod ollama;
mod openai;
mod payload;

// Re-export module content
pub use chat::{ChatModel, StrOutputParser};
pub use message::{ChatMessage, Role};
pub use ollama::OllamaModel;
pub use openai::OpenAIChatModel;
pub use payload::{InvokeRequest, InvokeResponse, RunMetadata};
