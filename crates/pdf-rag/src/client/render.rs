//! Text rendering of a conversation

use std::collections::HashSet;

use super::session::{ChatMessage, ChatSession, MessageId, Role};

/// Shown in place of the pending assistant message
pub const TYPING_INDICATOR: &str = "Assistant is typing...";

/// Which messages have their sources expanded
#[derive(Debug, Clone, Default)]
pub struct Disclosure {
    expanded: HashSet<MessageId>,
}

impl Disclosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a message between collapsed and expanded; returns the new state
    pub fn toggle(&mut self, id: MessageId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn is_expanded(&self, id: MessageId) -> bool {
        self.expanded.contains(&id)
    }
}

/// Render one message as display lines
pub fn render_message(message: &ChatMessage, disclosure: &Disclosure) -> Vec<String> {
    if message.is_pending() {
        return vec![TYPING_INDICATOR.to_string()];
    }

    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    let mut lines = vec![format!("{}: {}", speaker, message.content)];

    if !message.sources.is_empty() {
        if disclosure.is_expanded(message.id) {
            lines.push(format!("▾ Sources ({})", message.sources.len()));
            lines.extend(message.sources.iter().map(|s| format!("  {}", s)));
        } else {
            lines.push(format!("▸ Sources ({})", message.sources.len()));
        }
    }

    lines
}

/// Render the conversation, keeping the newest `viewport` lines in view
pub fn render_session(
    session: &ChatSession,
    disclosure: &Disclosure,
    viewport: Option<usize>,
) -> Vec<String> {
    let lines: Vec<String> = session
        .messages()
        .iter()
        .flat_map(|m| render_message(m, disclosure))
        .collect();

    match viewport {
        Some(rows) if lines.len() > rows => lines[lines.len() - rows..].to_vec(),
        _ => lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::ChatMessage;

    fn answered_session() -> (ChatSession, MessageId) {
        let mut session = ChatSession::new();
        let id = session.begin("What is the refund policy?").unwrap();
        session.resolve(
            id,
            ChatMessage::answer(
                id,
                "Refunds within 30 days.",
                vec![
                    "📄 policy.pdf (Page 4) → Refunds are issued within 30 days.".to_string(),
                    "📄 policy.pdf (Page N/A) → Contact support.".to_string(),
                ],
            ),
        );
        (session, id)
    }

    #[test]
    fn test_pending_renders_typing_indicator() {
        let mut session = ChatSession::new();
        session.begin("hello").unwrap();

        let lines = render_session(&session, &Disclosure::new(), None);
        assert_eq!(lines, vec!["You: hello", "Assistant is typing..."]);
    }

    #[test]
    fn test_sources_collapsed_then_expanded() {
        let (session, id) = answered_session();
        let mut disclosure = Disclosure::new();

        let collapsed = render_session(&session, &disclosure, None);
        assert_eq!(collapsed.last().map(String::as_str), Some("▸ Sources (2)"));

        assert!(disclosure.toggle(id));
        let expanded = render_session(&session, &disclosure, None);
        assert!(expanded.contains(&"▾ Sources (2)".to_string()));
        assert!(expanded.iter().any(|l| l.contains("policy.pdf (Page 4)")));

        assert!(!disclosure.toggle(id));
    }

    #[test]
    fn test_viewport_follows_newest_lines() {
        let (session, _) = answered_session();
        let lines = render_session(&session, &Disclosure::new(), Some(1));
        assert_eq!(lines, vec!["▸ Sources (2)"]);
    }
}
