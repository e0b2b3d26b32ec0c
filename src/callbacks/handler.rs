// Callback handler interface definition
use std::collections::HashMap;

use log::{error, info};

// Minimal callback system (aligned with langchain-core)
pub trait CallbackHandler: Send + Sync {
    // Chain related callbacks (core)
    fn on_chain_start(&self, _chain_name: &str, _inputs: &HashMap<String, String>) {}

    fn on_chain_end(&self, _chain_name: &str, _output: &str) {}

    fn on_chain_error(&self, _chain_name: &str, _error: &str) {}
}

// Writes chain runs to the log; installed when tracing is switched on
#[derive(Clone, Debug, Default)]
pub struct LoggingCallbackHandler {
    project: Option<String>,
}

impl LoggingCallbackHandler {
    pub fn new(project: Option<String>) -> Self {
        Self { project }
    }

    fn project(&self) -> &str {
        self.project.as_deref().unwrap_or("default")
    }
}

impl CallbackHandler for LoggingCallbackHandler {
    fn on_chain_start(&self, chain_name: &str, inputs: &HashMap<String, String>) {
        let mut keys: Vec<&str> = inputs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        info!("[{}] chain {} start, inputs={:?}", self.project(), chain_name, keys);
    }

    fn on_chain_end(&self, chain_name: &str, output: &str) {
        info!("[{}] chain {} end, {} chars", self.project(), chain_name, output.chars().count());
    }

    fn on_chain_error(&self, chain_name: &str, err: &str) {
        error!("[{}] chain {} failed: {}", self.project(), chain_name, err);
    }
}
