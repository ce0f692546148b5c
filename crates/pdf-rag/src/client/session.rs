//! Ordered conversation with a single in-flight assistant reply

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of an assistant message produced from a failed request
pub const ERROR_PREFIX: &str = "❌ Error: ";

/// Placeholder content of the pending assistant message
pub const PENDING_CONTENT: &str = "...";

/// Correlation id tying a pending reply to its request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Complete,
    Failed,
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Rendered citation strings (assistant only)
    pub sources: Vec<String>,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            status: MessageStatus::Complete,
        }
    }

    pub fn pending(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: PENDING_CONTENT.to_string(),
            sources: Vec::new(),
            status: MessageStatus::Pending,
        }
    }

    pub fn answer(id: MessageId, content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            sources,
            status: MessageStatus::Complete,
        }
    }

    pub fn failure(id: MessageId, message: &str) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: format!("{}{}", ERROR_PREFIX, message),
            sources: Vec::new(),
            status: MessageStatus::Failed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}

/// Ordered message list
///
/// At most one message is pending, and when present it is the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The pending assistant message, if any
    pub fn pending(&self) -> Option<&ChatMessage> {
        self.messages.last().filter(|m| m.is_pending())
    }

    /// Append a user message and a pending reply; returns the reply's id.
    /// Returns `None` if a reply is already pending.
    pub fn begin(&mut self, text: &str) -> Option<MessageId> {
        if self.pending().is_some() {
            return None;
        }

        let id = MessageId::new();
        self.messages.push(ChatMessage::user(text));
        self.messages.push(ChatMessage::pending(id));
        Some(id)
    }

    /// Replace the pending message carrying `id`; returns false if none matches
    pub fn resolve(&mut self, id: MessageId, message: ChatMessage) -> bool {
        match self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_pending())
        {
            Some(slot) => {
                *slot = ChatMessage { id, ..message };
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_appends_user_and_pending() {
        let mut session = ChatSession::new();
        let id = session.begin("What is the refund policy?").unwrap();

        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[0].content, "What is the refund policy?");
        assert_eq!(session.pending().map(|m| m.id), Some(id));
        assert_eq!(session.messages()[1].content, "...");
    }

    #[test]
    fn test_second_begin_rejected_while_pending() {
        let mut session = ChatSession::new();
        session.begin("first").unwrap();
        assert!(session.begin("second").is_none());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_resolve_by_id() {
        let mut session = ChatSession::new();
        let id = session.begin("q").unwrap();

        let resolved = session.resolve(
            id,
            ChatMessage::answer(MessageId::new(), "answer", vec!["📄 a.pdf (Page 1) → x".into()]),
        );

        assert!(resolved);
        assert!(session.pending().is_none());
        let reply = &session.messages()[1];
        assert_eq!(reply.id, id);
        assert_eq!(reply.content, "answer");
        assert_eq!(reply.sources.len(), 1);
        assert_eq!(reply.status, MessageStatus::Complete);
    }

    #[test]
    fn test_resolve_unknown_id_is_ignored() {
        let mut session = ChatSession::new();
        session.begin("q").unwrap();
        let before = session.clone();

        assert!(!session.resolve(MessageId::new(), ChatMessage::failure(MessageId::new(), "x")));
        assert_eq!(session, before);
    }

    #[test]
    fn test_failure_content_is_prefixed() {
        let msg = ChatMessage::failure(MessageId::new(), "timed out");
        assert_eq!(msg.content, "❌ Error: timed out");
        assert_eq!(msg.status, MessageStatus::Failed);
    }
}
