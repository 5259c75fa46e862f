//! Demo router: a greeting, a two-step name prompt, a paged menu and an echo fallback.

use std::sync::Arc;

use async_trait::async_trait;
use gbot_core::{Dispatcher, HandlerError, HandlerResponse, MessageType, Result};
use handler_chain::{Context, Handler, PendingState, Router};
use middleware::{AuthMiddleware, LoggingMiddleware};
use tracing::info;

use crate::config::GbotConfig;

pub const START: &str = "/start";
pub const ASK_NAME: &str = "/ask-name";
pub const GOT_NAME: &str = "/got-name";
pub const MENU: &str = "/menu";

/// Builds the demo router from `config`. The allowlist middleware is installed only when
/// `config.allowed_users` is non-empty.
pub fn build_router(config: &GbotConfig, dispatcher: Arc<dyn Dispatcher>) -> Arc<Router> {
    let mut builder = Router::builder();
    if !config.allowed_users.is_empty() {
        builder = builder.use_middleware(AuthMiddleware::new(config.allowed_users.clone()));
    }
    builder
        .use_middleware(LoggingMiddleware)
        .handle(START, Start)
        .handle(ASK_NAME, AskName)
        .handle(GOT_NAME, GotName)
        .handle(MENU, Menu)
        .default_handler(Echo)
        .back_endpoint(config.back_endpoint.clone())
        .config(config.router_config())
        .dispatcher(dispatcher)
        .build()
}

struct Start;

#[async_trait]
impl Handler for Start {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let name = ctx.message().from.name.clone();
        let greeting = if name.is_empty() {
            "Welcome!".to_string()
        } else {
            format!("Welcome, {}!", name)
        };
        ctx.reply(&format!(
            "{} Try {}, {}?page=1 or {}.",
            greeting,
            ASK_NAME,
            MENU,
            ctx.router().config().back_endpoint
        ))
        .await
    }
}

struct AskName;

#[async_trait]
impl Handler for AskName {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        ctx.set_next_state(PendingState::new(GOT_NAME));
        ctx.reply("What is your name?").await
    }
}

struct GotName;

#[async_trait]
impl Handler for GotName {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let name = ctx.message().text.trim().to_string();
        if name.is_empty() {
            return Err(HandlerError::MissingParam("name".to_string()).into());
        }
        info!(user_id = ctx.user_id(), name = %name, "step: name captured");
        // Drop the free-text frame so back skips it.
        ctx.clean_state();
        ctx.reply(&format!("Nice to meet you, {}.", name)).await
    }
}

struct Menu;

#[async_trait]
impl Handler for Menu {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let page = ctx.param_str("page").unwrap_or("1").to_string();
        ctx.reply(&format!("Menu page {}", page)).await
    }
}

struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let message = ctx.message();
        let reply = match message.message_type() {
            MessageType::Text => format!("echo: {}", message.text),
            other => format!("received {}", other),
        };
        ctx.reply(&reply).await
    }
}
