//! Drives a `ChatSession` through send and resolution

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use super::api::ChatApi;
use super::session::{ChatMessage, ChatSession, MessageId};

/// Why a send was not dispatched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// Input was empty after trimming
    #[error("message is empty")]
    Empty,
    /// A reply is still pending
    #[error("waiting for the previous answer")]
    Busy,
}

/// Owns the conversation and reconciles replies by correlation id
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    session: Mutex<ChatSession>,
    revision: watch::Sender<u64>,
}

impl ChatController {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            session: Mutex::new(ChatSession::new()),
            revision,
        }
    }

    /// Copy of the current conversation
    pub fn snapshot(&self) -> ChatSession {
        self.session.lock().clone()
    }

    /// Whether a reply is pending
    pub fn is_awaiting(&self) -> bool {
        self.session.lock().pending().is_some()
    }

    /// Current revision; bumped on every session mutation
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Observe session mutations
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Send a question and wait for its reply to land in the session.
    ///
    /// Request failures are recorded as an error message, never returned.
    pub async fn send(&self, text: &str) -> Result<MessageId, SendError> {
        let id = self.begin(text)?;
        self.dispatch(id, text).await;
        Ok(id)
    }

    /// Optimistically append the user message and a pending reply
    pub fn begin(&self, text: &str) -> Result<MessageId, SendError> {
        if text.trim().is_empty() {
            return Err(SendError::Empty);
        }

        let id = self.session.lock().begin(text).ok_or(SendError::Busy)?;
        self.bump();
        tracing::debug!("Dispatching message {}", id);
        Ok(id)
    }

    /// Run the request for a begun message and resolve it
    pub async fn dispatch(&self, id: MessageId, text: &str) {
        let message = match self.api.ask(text).await {
            Ok(response) => {
                let sources = response.source_lines();
                ChatMessage::answer(id, response.answer_text, sources)
            }
            Err(e) => {
                tracing::warn!("Message {} failed: {}", id, e);
                ChatMessage::failure(id, &e.to_string())
            }
        };
        self.resolve(id, message);
    }

    /// Replace the pending message carrying `id`
    pub fn resolve(&self, id: MessageId, message: ChatMessage) {
        let replaced = self.session.lock().resolve(id, message);
        if replaced {
            self.bump();
        } else {
            tracing::warn!("No pending message {}", id);
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
