use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single transcript entry, exactly the shape the backend stores.
///
/// Messages are append-only; insertion order is the display and
/// transcript order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// Create a new bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
        }
    }
}

/// Role and description for the interview, fetched once at load time
/// and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobContext {
    pub job_role: String,
    pub job_description: String,
}

/// Phase of the turn-taking loop.
///
/// A new turn may only start while idle; the controller rejects triggers
/// while a completion request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    AwaitingReply,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = Message::user("I build APIs");
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.text, "I build APIs");

        let bot = Message::bot("Good answer");
        assert_eq!(bot.sender, Sender::Bot);
    }

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(Message::user("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello", "sender": "user"}));

        let msg: Message = serde_json::from_value(
            serde_json::json!({"text": "Feedback: good", "sender": "bot"}),
        )
        .unwrap();
        assert_eq!(msg.sender, Sender::Bot);
    }
}
