//! HTTP access to `POST /chat`

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::types::{response::ErrorBody, ChatResponse, QueryRequest, QueryResponse};

/// Client-side failures of one chat round trip
#[derive(Debug, thiserror::Error)]
pub enum ChatApiError {
    /// Server answered with a non-2xx status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No answer within the request deadline
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Something that can answer a question
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Ask one question and get the typed answer
    async fn ask(&self, question: &str) -> Result<QueryResponse, ChatApiError>;
}

/// `ChatApi` over HTTP with reqwest
pub struct HttpChatClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpChatClient {
    /// Create a client for the configured server
    pub fn new(config: &ClientConfig) -> Result<Self, ChatApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ChatApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl ChatApi for HttpChatClient {
    async fn ask(&self, question: &str) -> Result<QueryResponse, ChatApiError> {
        let response = self
            .client
            .post(self.chat_url())
            .json(&QueryRequest::new(question))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatApiError::Timeout(self.timeout_secs)
                } else {
                    ChatApiError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| format!("Server returned {}", status));
            return Err(ChatApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ChatApiError::Timeout(self.timeout_secs)
            } else {
                ChatApiError::Decode(e.to_string())
            }
        })?;

        Ok(body.into_query_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_strips_trailing_slash() {
        let client = HttpChatClient::new(&ClientConfig {
            server_url: "http://localhost:8000/".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.chat_url(), "http://localhost:8000/chat");
    }

    #[test]
    fn test_server_error_displays_message_only() {
        let err = ChatApiError::Server {
            status: 500,
            message: "Embedding error: quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Embedding error: quota exceeded");
    }
}
