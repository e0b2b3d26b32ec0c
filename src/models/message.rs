// Message type definitions
use serde::{Deserialize, Serialize};

// Message roles (aligned with langchain-core)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[serde(rename = "user")]
    Human,
    #[serde(rename = "assistant")]
    AI,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::AI => "assistant",
        }
    }

    // Unknown roles coming back from a backend are treated as assistant output
    pub fn from_wire(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" | "human" => Role::Human,
            _ => Role::AI,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::AI, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        let json = serde_json::to_string(&ChatMessage::human("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);

        let json = serde_json::to_string(&ChatMessage::ai("yo")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"yo"}"#);
    }

    #[test]
    fn test_from_wire_defaults_to_ai() {
        assert_eq!(Role::from_wire("system"), Role::System);
        assert_eq!(Role::from_wire("user"), Role::Human);
        assert_eq!(Role::from_wire("tool"), Role::AI);
    }
}
