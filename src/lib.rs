// Prompt Relay: prompt templates piped into model backends, served and dispatched over HTTP

mod core;
mod models;
pub mod prompt;
pub mod dispatch;
pub mod server;
pub mod catalog;
pub mod config;
mod callbacks;
mod error;

// Re-export main components for external use
pub use self::core::{pipe, BoxFuture, Pipe, Runnable, RunnableExt, RunnableLambda, RunnableSequence};
pub use models::{
    ChatMessage, ChatModel, InvokeRequest, InvokeResponse, OllamaModel, OpenAIChatModel, Role, RunMetadata,
    StrOutputParser,
};
pub use prompt::{ChatPromptTemplate, PromptTemplate, Segment};
pub use dispatch::{
    DispatchOutcome, Dispatcher, DispatcherConfig, EndpointIdentity, PromptPipeline, RemoteRunnable, FALLBACK_MESSAGE,
};
pub use server::{ChainServer, SharedChain};
pub use callbacks::{CallbackHandler, LoggingCallbackHandler};
pub use self::config::RelayConfig;
pub use error::{RelayError, Result};

// Export anyhow so binaries and embedders share one top-level error type
pub use anyhow;
