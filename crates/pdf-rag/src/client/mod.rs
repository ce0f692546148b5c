//! Chat client: HTTP access to the server and the conversation state machine

pub mod api;
pub mod controller;
pub mod render;
pub mod session;

pub use api::{ChatApi, ChatApiError, HttpChatClient};
pub use controller::{ChatController, SendError};
pub use render::{render_message, render_session, Disclosure, TYPING_INDICATOR};
pub use session::{ChatMessage, ChatSession, MessageId, MessageStatus, Role};
