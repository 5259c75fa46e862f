//! Middleware for logging and optional auth (allowlist).

use std::collections::HashSet;

use async_trait::async_trait;
use gbot_core::{HandlerError, HandlerResponse, Result};
use handler_chain::{Context, Handler};
use tracing::{debug, error, info, instrument};

/// Logs each event on the way in and the chain's response on the way out; always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Handler for LoggingMiddleware {
    #[instrument(skip(self, ctx), fields(user_id = ctx.user_id(), chat_id = ctx.chat_id()))]
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let message = ctx.message();
        info!(
            username = %message.from.username,
            message_type = %message.message_type(),
            endpoint = %ctx.endpoint(),
            text = %message.text,
            "Received message"
        );
        let result = ctx.next().await;
        match &result {
            Ok(response) => debug!(
                message_id = ctx.message().message_id,
                response = ?response,
                "Processed message"
            ),
            Err(e) => error!(error = %e, "Handler chain failed"),
        }
        result
    }

    fn name(&self) -> &'static str {
        "LoggingMiddleware"
    }
}

/// Stops the chain with [`HandlerError::Unauthorized`] unless the sender is in the allowlist.
pub struct AuthMiddleware {
    allowed_users: HashSet<i64>,
}

impl AuthMiddleware {
    /// Creates a middleware that allows only the given user ids.
    pub fn new(allowed_users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed_users: allowed_users.into_iter().collect(),
        }
    }

    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.contains(&user_id)
    }
}

#[async_trait]
impl Handler for AuthMiddleware {
    #[instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let user_id = ctx.user_id();
        if self.is_allowed(user_id) {
            debug!(user_id = user_id, "User authorized");
            ctx.next().await
        } else {
            error!(user_id = user_id, "Unauthorized access attempt");
            Err(HandlerError::Unauthorized.into())
        }
    }

    fn name(&self) -> &'static str {
        "AuthMiddleware"
    }
}
