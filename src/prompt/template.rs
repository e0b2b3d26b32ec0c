// Prompt template implementation
use std::collections::HashMap;

use crate::core::{BoxFuture, Runnable};
use crate::error::RelayError;
use crate::models::{ChatMessage, InvokeRequest};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Text with named `{placeholder}` slots. `{{` and `}}` stand for literal braces.
/// Names are taken verbatim, so `{ topic }` needs a value keyed ` topic `.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn from_template(text: &str) -> Result<Self, RelayError> {
        Ok(Self {
            segments: parse_segments(text)?,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    // Distinct placeholder names in order of first appearance
    pub fn input_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// First placeholder (in template order) with no entry in `values`.
    pub fn check(&self, values: &HashMap<String, String>) -> Result<(), RelayError> {
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !values.contains_key(name) {
                    return Err(RelayError::missing(name.as_str()));
                }
            }
        }
        Ok(())
    }

    // Render the template text; values are inserted verbatim
    pub fn format(&self, values: &HashMap<String, String>) -> Result<String, RelayError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values.get(name).ok_or_else(|| RelayError::missing(name.as_str()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Build the outbound `{"input": values}` request. The payload carries
    /// `values` unchanged; the template only decides which keys are required.
    pub fn fill(&self, values: &HashMap<String, String>) -> Result<InvokeRequest, RelayError> {
        self.check(values)?;
        Ok(InvokeRequest::new(values.clone()))
    }
}

// A string prompt becomes a single human message for chat backends
impl Runnable<HashMap<String, String>, Vec<ChatMessage>> for PromptTemplate {
    fn invoke(&self, input: HashMap<String, String>) -> BoxFuture<'_, Result<Vec<ChatMessage>, RelayError>> {
        let result = self.format(&input).map(|text| vec![ChatMessage::human(text)]);
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        "PromptTemplate"
    }
}

pub(crate) fn parse_segments(text: &str) -> Result<Vec<Segment>, RelayError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    if inner == '{' {
                        return Err(RelayError::InvalidTemplate(format!("nested `{{` in placeholder `{}`", name)));
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(RelayError::InvalidTemplate(format!("unterminated placeholder `{{{}`", name)));
                }
                if name.is_empty() {
                    return Err(RelayError::InvalidTemplate("empty placeholder `{}`".to_string()));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            '}' => {
                return Err(RelayError::InvalidTemplate("single `}` outside a placeholder".to_string()));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
