//! Conversation turn types.
//!
//! A conversation is an ordered `Vec<ChatTurn>`, oldest first. The same type
//! flows into chat backends, out of conversation stores, and through the
//! decision loop's working history.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (prompt, protocol)
    System,
    /// The end user
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// A tool turn in the `tool:<name>\nargs:<json>\nresult:<json>` layout the
    /// decision loop feeds back to the model.
    pub fn tool(tool_name: &str, args_json: &str, result_json: &str) -> Self {
        Self::new(
            Role::Tool,
            format!("tool:{tool_name}\nargs:{args_json}\nresult:{result_json}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("Assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!("narrator".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::system("x")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"x"}"#);
    }

    #[test]
    fn tool_turn_layout() {
        let turn = ChatTurn::tool("calculator", r#"{"expr":"2+2"}"#, r#"{"result":4}"#);
        assert_eq!(turn.role, Role::Tool);
        assert_eq!(
            turn.content,
            "tool:calculator\nargs:{\"expr\":\"2+2\"}\nresult:{\"result\":4}"
        );
    }
}
