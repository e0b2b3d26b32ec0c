// Built-in pipelines shared by the server and the client
use std::collections::HashMap;

use crate::core::{pipe, Runnable, RunnableSequence};
use crate::dispatch::{EndpointIdentity, PromptPipeline};
use crate::error::RelayError;
use crate::models::{ChatMessage, Role, StrOutputParser};
use crate::prompt::{ChatPromptTemplate, PromptTemplate};

pub const STORY_ROUTE: &str = "/story";
pub const POEM_ROUTE: &str = "/poem";

pub const STORY_TEMPLATE: &str = "Write me a short story about {topic} within 100 words";
pub const POEM_TEMPLATE: &str = "write me a short poem on {topic} with 10 words";

pub const CHATBOT_SYSTEM: &str =
    "You are an expert assistant.Please give the response in a clear and concise manner.";
pub const CHATBOT_USER: &str = "Question:{question}";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteDefinition {
    pub name: &'static str,
    pub route: &'static str,
    pub template: &'static str,
}

pub static ROUTES: [RouteDefinition; 2] = [
    RouteDefinition {
        name: "story",
        route: STORY_ROUTE,
        template: STORY_TEMPLATE,
    },
    RouteDefinition {
        name: "poem",
        route: POEM_ROUTE,
        template: POEM_TEMPLATE,
    },
];

pub fn route(name: &str) -> Option<&'static RouteDefinition> {
    ROUTES.iter().find(|definition| definition.name == name)
}

impl RouteDefinition {
    pub fn template(&self) -> Result<PromptTemplate, RelayError> {
        PromptTemplate::from_template(self.template)
    }

    pub fn pipeline(&self, base_url: &str) -> Result<PromptPipeline, RelayError> {
        Ok(PromptPipeline::new(
            self.name,
            self.template()?,
            EndpointIdentity::new(base_url, self.route)?,
        ))
    }
}

pub fn chatbot_prompt() -> Result<ChatPromptTemplate, RelayError> {
    ChatPromptTemplate::from_messages([(Role::System, CHATBOT_SYSTEM), (Role::Human, CHATBOT_USER)])
}

// prompt | model | StrOutputParser
pub fn text_chain<P, M>(prompt: P, model: M) -> RunnableSequence<HashMap<String, String>, String>
where
    P: Runnable<HashMap<String, String>, Vec<ChatMessage>> + 'static,
    M: Runnable<Vec<ChatMessage>, ChatMessage> + 'static,
{
    let prompted = pipe::<P, M, Vec<ChatMessage>>(prompt, model);
    RunnableSequence::new(pipe::<_, StrOutputParser, ChatMessage>(prompted, StrOutputParser))
}
