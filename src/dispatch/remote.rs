// Remote chain usable as a local Runnable
use std::collections::HashMap;

use super::dispatcher::Dispatcher;
use super::endpoint::EndpointIdentity;
use crate::core::{BoxFuture, Runnable};
use crate::error::RelayError;
use crate::models::InvokeRequest;

#[derive(Clone, Debug)]
pub struct RemoteRunnable {
    dispatcher: Dispatcher,
    endpoint: EndpointIdentity,
    name: String,
}

impl RemoteRunnable {
    pub fn new(dispatcher: Dispatcher, endpoint: EndpointIdentity) -> Self {
        let name = endpoint.to_string();
        Self {
            dispatcher,
            endpoint,
            name,
        }
    }

    pub fn endpoint(&self) -> &EndpointIdentity {
        &self.endpoint
    }
}

impl Runnable<HashMap<String, String>, String> for RemoteRunnable {
    fn invoke(&self, input: HashMap<String, String>) -> BoxFuture<'_, Result<String, RelayError>> {
        Box::pin(async move {
            let request = InvokeRequest::new(input);
            self.dispatcher.invoke(&self.endpoint, &request).await
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
