// Chat prompt template: one template per message role
use std::collections::HashMap;

use super::template::PromptTemplate;
use crate::core::{BoxFuture, Runnable};
use crate::error::RelayError;
use crate::models::{ChatMessage, Role};

#[derive(Clone, Debug)]
pub struct ChatPromptTemplate {
    messages: Vec<(Role, PromptTemplate)>,
}

impl ChatPromptTemplate {
    pub fn from_messages<S: AsRef<str>>(messages: impl IntoIterator<Item = (Role, S)>) -> Result<Self, RelayError> {
        let messages = messages
            .into_iter()
            .map(|(role, text)| Ok((role, PromptTemplate::from_template(text.as_ref())?)))
            .collect::<Result<Vec<_>, RelayError>>()?;
        Ok(Self { messages })
    }

    pub fn input_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (_, template) in &self.messages {
            for name in template.input_variables() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn format_messages(&self, values: &HashMap<String, String>) -> Result<Vec<ChatMessage>, RelayError> {
        self.messages
            .iter()
            .map(|(role, template)| Ok(ChatMessage::new(*role, template.format(values)?)))
            .collect()
    }
}

impl Runnable<HashMap<String, String>, Vec<ChatMessage>> for ChatPromptTemplate {
    fn invoke(&self, input: HashMap<String, String>) -> BoxFuture<'_, Result<Vec<ChatMessage>, RelayError>> {
        let result = self.format_messages(&input);
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        "ChatPromptTemplate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chatbot_prompt() -> ChatPromptTemplate {
        ChatPromptTemplate::from_messages([
            (Role::System, "You are an expert assistant."),
            (Role::Human, "Question:{question}"),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_messages() {
        let mut values = HashMap::new();
        values.insert("question".to_string(), "why is the sky blue?".to_string());

        let messages = chatbot_prompt().format_messages(&values).unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("You are an expert assistant."),
                ChatMessage::human("Question:why is the sky blue?"),
            ]
        );
    }

    #[test]
    fn test_missing_question() {
        let err = chatbot_prompt().format_messages(&HashMap::new()).unwrap_err();
        assert!(matches!(err, RelayError::MissingPlaceholder { ref key } if key == "question"));
        assert_eq!(chatbot_prompt().input_variables(), vec!["question".to_string()]);
    }
}
