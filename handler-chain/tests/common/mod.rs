//! Shared helpers for handler-chain integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gbot_core::{Dispatcher, HandlerResponse, Message, Result, SentMessage};
use handler_chain::{Context, Handler, PendingState};

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn text(user_id: i64, text: &str) -> Message {
    Message::text(100 + user_id, user_id, text)
}

/// Records its name, then continues the chain when `forward` is set.
pub struct Step {
    pub name: &'static str,
    pub log: Log,
    pub forward: bool,
}

impl Step {
    pub fn forward(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            forward: true,
        }
    }

    pub fn halt(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            forward: false,
        }
    }
}

#[async_trait]
impl Handler for Step {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        self.log.lock().unwrap().push(self.name.to_string());
        if self.forward {
            ctx.next().await
        } else {
            Ok(HandlerResponse::Reply(self.name.to_string()))
        }
    }
}

/// Records its name (and `=param` when asked for one), then replies with its name.
pub struct Endpoint {
    pub name: &'static str,
    pub log: Log,
    pub param: Option<&'static str>,
}

impl Endpoint {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            param: None,
        }
    }

    pub fn with_param(name: &'static str, param: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            param: Some(param),
        }
    }
}

#[async_trait]
impl Handler for Endpoint {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let mut entry = self.name.to_string();
        if let Some(key) = self.param {
            entry.push('=');
            entry.push_str(ctx.param_str(key).unwrap_or("<none>"));
        }
        self.log.lock().unwrap().push(entry);
        Ok(HandlerResponse::Reply(self.name.to_string()))
    }
}

/// Schedules the sender's next event for `target`.
pub struct AskThen {
    pub target: &'static str,
}

#[async_trait]
impl Handler for AskThen {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        let asked_by = ctx.endpoint().to_string();
        ctx.set_next_state(PendingState::new(self.target).with_param("asked_by", asked_by));
        Ok(HandlerResponse::Reply("asked".to_string()))
    }
}

/// Logs its name and goes back.
pub struct GoBack {
    pub name: &'static str,
    pub log: Log,
}

#[async_trait]
impl Handler for GoBack {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        self.log.lock().unwrap().push(self.name.to_string());
        ctx.back().await
    }
}

/// Counts invocations.
pub struct Counter(pub Arc<AtomicUsize>);

#[async_trait]
impl Handler for Counter {
    async fn handle(&self, _ctx: &mut Context) -> Result<HandlerResponse> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(HandlerResponse::Empty)
    }
}

/// Fails with a handler error.
pub struct Failing;

#[async_trait]
impl Handler for Failing {
    async fn handle(&self, _ctx: &mut Context) -> Result<HandlerResponse> {
        Err(gbot_core::HandlerError::InvalidCommand("boom".to_string()).into())
    }
}

/// In-memory dispatcher recording every sent text as `(chat_id, text)`.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<(i64, String)>>,
    next_id: AtomicI64,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn edit_text(&self, _chat_id: i64, _message_id: i64, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> Result<()> {
        Ok(())
    }

    async fn answer_callback(
        &self,
        _chat_id: i64,
        _callback_id: &str,
        _text: &str,
        _show_alert: bool,
    ) -> Result<()> {
        Ok(())
    }
}
