//! Unit tests for LoggingMiddleware and AuthMiddleware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gbot_core::{GbotError, HandlerError, HandlerResponse, Message, Result};
use handler_chain::{Context, Handler, Router};

use crate::{AuthMiddleware, LoggingMiddleware};

fn sample_message(user_id: i64, text: &str) -> Message {
    let mut message = Message::text(123, user_id, text);
    message.from.username = "testuser".to_string();
    message
}

struct Counted(Arc<AtomicUsize>);

#[async_trait]
impl Handler for Counted {
    async fn handle(&self, _ctx: &mut Context) -> Result<HandlerResponse> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(HandlerResponse::Reply("hi".to_string()))
    }
}

#[tokio::test]
async fn test_logging_middleware_continues_and_returns_response() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .use_middleware(LoggingMiddleware)
        .handle("/hello", Counted(calls.clone()))
        .build();

    let result = router.dispatch(sample_message(1, "/hello")).await;

    assert_eq!(result.unwrap(), HandlerResponse::Reply("hi".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_logging_middleware_passes_errors_through() {
    struct Broken;

    #[async_trait]
    impl Handler for Broken {
        async fn handle(&self, _ctx: &mut Context) -> Result<HandlerResponse> {
            Err(HandlerError::MissingParam("id".to_string()).into())
        }
    }

    let router = Router::builder()
        .use_middleware(LoggingMiddleware)
        .handle("/hello", Broken)
        .build();

    let result = router.dispatch(sample_message(1, "/hello")).await;

    assert!(matches!(
        result.unwrap_err(),
        GbotError::Handler(HandlerError::MissingParam(ref p)) if p == "id"
    ));
}

#[tokio::test]
async fn test_auth_middleware_allowed_user_continues() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .use_middleware(AuthMiddleware::new(vec![100, 200]))
        .handle("/hello", Counted(calls.clone()))
        .build();

    let result = router.dispatch(sample_message(100, "/hello")).await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_auth_middleware_unauthorized_returns_err() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .use_middleware(AuthMiddleware::new(vec![100, 200]))
        .handle("/hello", Counted(calls.clone()))
        .build();

    let result = router.dispatch(sample_message(999, "/hello")).await;

    assert!(matches!(
        result.unwrap_err(),
        GbotError::Handler(HandlerError::Unauthorized)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// **Test: Auth runs before logging when registered first, so rejected users are never logged.**
///
/// **Setup:** [AuthMiddleware, LoggingMiddleware], default handler counting.
/// **Action:** dispatch free text from an allowed and a rejected user.
/// **Expected:** only the allowed event reaches the default handler.
#[tokio::test]
async fn test_auth_then_logging_with_default_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .use_middleware(AuthMiddleware::new([7]))
        .use_middleware(LoggingMiddleware)
        .default_handler(Counted(calls.clone()))
        .build();

    assert!(router.dispatch(sample_message(7, "anything")).await.is_ok());
    assert!(router.dispatch(sample_message(8, "anything")).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_auth_middleware_is_allowed() {
    let mw = AuthMiddleware::new(vec![1, 2]);
    assert!(mw.is_allowed(1));
    assert!(!mw.is_allowed(3));
}
