// Wire payloads of the `/invoke` route convention
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Body of `POST {route}/invoke`: `{"input": {"<placeholder>": "<value>"}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub input: HashMap<String, String>,
}

impl InvokeRequest {
    pub fn new(input: HashMap<String, String>) -> Self {
        Self { input }
    }

    /// Single-value request, the shape every built-in pipeline uses.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut input = HashMap::new();
        input.insert(key.into(), value.into());
        Self { input }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
}

/// Successful reply produced by the chain server. Clients only read `output`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub output: String,
    pub metadata: RunMetadata,
}

impl InvokeResponse {
    pub fn new(output: String) -> Self {
        Self {
            output,
            metadata: RunMetadata {
                run_id: Uuid::new_v4(),
            },
        }
    }
}
