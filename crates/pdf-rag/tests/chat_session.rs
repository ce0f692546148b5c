//! Conversation tests for the chat controller

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use pdf_rag::client::{
    render_session, ChatApi, ChatApiError, ChatController, Disclosure, HttpChatClient,
    MessageStatus, Role,
};
use pdf_rag::config::ClientConfig;
use pdf_rag::{ChatResponse, QueryResponse, RetrievalResult};

struct RefundDesk;

#[async_trait]
impl ChatApi for RefundDesk {
    async fn ask(&self, question: &str) -> Result<QueryResponse, ChatApiError> {
        if question.contains("refund") {
            let results = [RetrievalResult::new(
                "Refunds are issued within 30 days of purchase.",
                "uploads/1700000000000-42-policy.pdf",
            )
            .with_page(4)];
            Ok(QueryResponse::new(
                Some("You can get a refund within 30 days of purchase.".to_string()),
                &results,
            ))
        } else {
            Ok(QueryResponse::new(None, &[]))
        }
    }
}

#[tokio::test]
async fn test_refund_question_round_trip() {
    let controller = ChatController::new(Arc::new(RefundDesk));
    let mut revisions = controller.subscribe();

    controller.send("What is the refund policy?").await.unwrap();
    assert!(revisions.has_changed().unwrap());

    let session = controller.snapshot();
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].status, MessageStatus::Complete);
    assert_eq!(messages[1].sources.len(), 1);
    assert!(messages[1].sources[0].contains("policy.pdf"));
    assert!(messages[1].sources[0].contains("(Page 4)"));

    let collapsed = render_session(&session, &Disclosure::new(), None);
    assert!(collapsed.contains(&"▸ Sources (1)".to_string()));
}

#[tokio::test]
async fn test_every_send_gets_one_reply() {
    let controller = ChatController::new(Arc::new(RefundDesk));

    controller.send("What is the refund policy?").await.unwrap();
    assert!(controller.send("   ").await.is_err());
    controller.send("Who wrote this?").await.unwrap();

    let session = controller.snapshot();
    let users = session.messages().iter().filter(|m| m.role == Role::User).count();
    let replies = session
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count();

    assert_eq!(users, 2);
    assert_eq!(replies, 2);
    assert!(session.pending().is_none());
    assert_eq!(session.messages()[3].content, "No response from AI.");
}

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_client_decodes_chat_response() {
    let router = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["query"], "What is the refund policy?");
            Json(json!({
                "aiContent": { "kwargs": { "content": "Within 30 days." } },
                "similaritySearchResults": [{
                    "pageContent": "Refunds are issued within 30 days.",
                    "metadata": { "source": "uploads/policy.pdf", "loc": { "pageNumber": 4 } }
                }]
            }))
        }),
    );
    let url = spawn_server(router).await;

    let client = HttpChatClient::new(&ClientConfig {
        server_url: url,
        request_timeout_secs: 5,
    })
    .unwrap();
    let response = client.ask("What is the refund policy?").await.unwrap();

    assert_eq!(response.answer_text, "Within 30 days.");
    assert_eq!(
        response.source_lines(),
        vec!["📄 policy.pdf (Page 4) → Refunds are issued within 30 days.".to_string()]
    );
}

#[tokio::test]
async fn test_server_error_becomes_error_message() {
    let router = Router::new().route(
        "/chat",
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "LLM error: quota exceeded" })),
            )
        }),
    );
    let url = spawn_server(router).await;

    let client = HttpChatClient::new(&ClientConfig {
        server_url: url,
        request_timeout_secs: 5,
    })
    .unwrap();
    let controller = ChatController::new(Arc::new(client));
    controller.send("What is the refund policy?").await.unwrap();

    let session = controller.snapshot();
    assert_eq!(session.messages()[1].content, "❌ Error: LLM error: quota exceeded");
}

#[tokio::test]
async fn test_request_timeout_becomes_error_message() {
    let router = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(ChatResponse::default())
        }),
    );
    let url = spawn_server(router).await;

    let client = HttpChatClient::new(&ClientConfig {
        server_url: url,
        request_timeout_secs: 1,
    })
    .unwrap();
    let controller = ChatController::new(Arc::new(client));
    controller.send("What is the refund policy?").await.unwrap();

    let session = controller.snapshot();
    let reply = &session.messages()[1];
    assert!(reply.content.starts_with("❌ Error: "));
    assert_eq!(reply.status, MessageStatus::Failed);
    assert!(session.pending().is_none());
}
