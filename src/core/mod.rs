// Core module definition
mod runnable;

// Re-export module content
pub use runnable::{pipe, BoxFuture, Pipe, Runnable, RunnableExt, RunnableLambda, RunnableSequence};
