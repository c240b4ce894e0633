use serde::{Deserialize, Serialize};

/// Attribution for a single turn in a conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,

    /// The model side of the conversation.
    Assistant,
}

/// One message exchanged in a conversation.
///
/// Turns are immutable once created; a transcript is an ordered sequence of
/// them, insertion order being conversation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,

    /// The text of the turn.
    pub content: String,
}

impl Turn {
    /// Create a new `Turn` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `Turn`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Turn`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&str> for Turn {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for Turn {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_turn_serialization() {
        let turn = Turn::user("Hello");
        let json = to_value(&turn).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": "Hello"
            })
        );
    }

    #[test]
    fn assistant_turn_serialization() {
        let turn = Turn::assistant("Hi there");
        let json = to_value(&turn).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "assistant",
                "content": "Hi there"
            })
        );
    }

    #[test]
    fn turn_deserialization() {
        let json = json!({
            "role": "assistant",
            "content": "Hi there"
        });

        let turn: Turn = serde_json::from_value(json).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "Hi there");
    }

    #[test]
    fn turn_from_str() {
        let turn: Turn = "Hello".into();
        assert_eq!(turn.role, Role::User);

        let turn = Turn::from("Hello from string".to_string());
        assert_eq!(turn.role, Role::User);
    }
}
