mod handler;

pub use handler::{CallbackHandler, LoggingCallbackHandler};
