// Prompt pipeline: a template bound to the endpoint that renders it
use std::collections::HashMap;

use log::info;

use super::dispatcher::{DispatchOutcome, Dispatcher};
use super::endpoint::EndpointIdentity;
use crate::error::RelayError;
use crate::models::InvokeRequest;
use crate::prompt::PromptTemplate;

#[derive(Clone, Debug)]
pub struct PromptPipeline {
    name: String,
    template: PromptTemplate,
    endpoint: EndpointIdentity,
}

impl PromptPipeline {
    pub fn new(name: impl Into<String>, template: PromptTemplate, endpoint: EndpointIdentity) -> Self {
        Self {
            name: name.into(),
            template,
            endpoint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn endpoint(&self) -> &EndpointIdentity {
        &self.endpoint
    }

    pub fn fill(&self, values: &HashMap<String, String>) -> Result<InvokeRequest, RelayError> {
        self.template.fill(values)
    }

    // Fill locally, then dispatch; a missing value never reaches the network
    pub async fn dispatch(
        &self,
        dispatcher: &Dispatcher,
        values: &HashMap<String, String>,
    ) -> Result<DispatchOutcome, RelayError> {
        let request = self.fill(values)?;
        info!("Running pipeline `{}` against {}", self.name, self.endpoint);
        dispatcher.dispatch(&self.endpoint, &request).await
    }

    pub async fn run(&self, dispatcher: &Dispatcher, values: &HashMap<String, String>) -> Result<String, RelayError> {
        Ok(self.dispatch(dispatcher, values).await?.into_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_value_does_not_dispatch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/story/invoke").expect(0).create_async().await;

        let pipeline = PromptPipeline::new(
            "story",
            PromptTemplate::from_template("A story about {topic}").unwrap(),
            EndpointIdentity::new(&server.url(), "/story").unwrap(),
        );

        let err = pipeline.run(&Dispatcher::default(), &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingPlaceholder { ref key } if key == "topic"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_run_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/story/invoke")
            .with_status(200)
            .with_body(r#"{"output": "Once upon a time"}"#)
            .create_async()
            .await;

        let pipeline = PromptPipeline::new(
            "story",
            PromptTemplate::from_template("A story about {topic}").unwrap(),
            EndpointIdentity::new(&server.url(), "/story").unwrap(),
        );
        let mut values = HashMap::new();
        values.insert("topic".to_string(), "a fox".to_string());

        let output = pipeline.run(&Dispatcher::default(), &values).await.unwrap();
        assert_eq!(output, "Once upon a time");
    }
}
