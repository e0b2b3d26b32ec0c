// Prompt module definition
mod chat;
mod template;

pub use chat::ChatPromptTemplate;
pub use template::{PromptTemplate, Segment};
