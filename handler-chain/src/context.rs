//! Per-dispatch context: message, params, the resolved chain with its cursor, and the sender's
//! navigation snapshot. Drives continuation ([`Context::next`]) and back navigation
//! ([`Context::back`]).

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use gbot_core::{Dispatcher, GbotError, HandlerResponse, Message, ParamValue, Params, Result};
use tracing::{debug, info, warn};

use crate::registry::{Chain, ChainSource};
use crate::router::Router;
use crate::state::{PendingState, State, UserState};

/// Replays already taken by the back traversal this context belongs to.
#[derive(Debug, Clone, Default)]
struct BackTrail {
    hops: usize,
    replayed: HashSet<String>,
}

pub struct Context {
    router: Arc<Router>,
    message: Arc<Message>,
    endpoint: String,
    params: Params,
    chain: Option<Chain>,
    source: Option<ChainSource>,
    cursor: usize,
    user_state: UserState,
    trail: BackTrail,
}

impl Context {
    /// Fresh context for one inbound event. Nothing is resolved until the first [`next`](Self::next).
    pub fn new(router: Arc<Router>, message: Arc<Message>) -> Self {
        Self {
            router,
            message,
            endpoint: String::new(),
            params: Params::new(),
            chain: None,
            source: None,
            cursor: 0,
            user_state: UserState::default(),
            trail: BackTrail::default(),
        }
    }

    fn replay(router: Arc<Router>, frame: &State, trail: BackTrail) -> Self {
        Self {
            params: frame.params.clone(),
            trail,
            ..Self::new(router, Arc::clone(&frame.message))
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn user_id(&self) -> i64 {
        self.message.sender_id()
    }

    pub fn chat_id(&self) -> i64 {
        self.message.chat_id
    }

    /// Resolved endpoint; empty before the first `next()`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Single-valued param as text.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(ParamValue::as_str)
    }

    pub fn with_param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Navigation snapshot taken at resolution and refreshed by this context's own mutations.
    pub fn user_state(&self) -> &UserState {
        &self.user_state
    }

    pub fn source(&self) -> Option<ChainSource> {
        self.source
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn chain_len(&self) -> usize {
        self.chain.as_ref().map_or(0, |c| c.len())
    }

    /// Replays taken so far by the back traversal this context is part of.
    pub fn back_hops(&self) -> usize {
        self.trail.hops
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn dispatcher(&self) -> Result<&Arc<dyn Dispatcher>> {
        self.router
            .dispatcher()
            .ok_or_else(|| GbotError::Dispatch("no dispatcher configured".to_string()))
    }

    /// Sends `text` to the current chat and reports it as the handler's response.
    pub async fn reply(&self, text: &str) -> Result<HandlerResponse> {
        let sent = self.dispatcher()?.send_text(self.chat_id(), text).await?;
        Ok(HandlerResponse::Sent(sent))
    }

    /// Invokes the handler at the cursor and advances. The chain is resolved on the first call;
    /// an empty chain yields [`HandlerResponse::Unhandled`], an exhausted one [`HandlerResponse::Empty`].
    pub fn next(&mut self) -> BoxFuture<'_, Result<HandlerResponse>> {
        Box::pin(async move {
            let chain = self.chain();
            let Some(handler) = chain.get(self.cursor).cloned() else {
                if chain.is_empty() {
                    info!(
                        user_id = self.user_id(),
                        endpoint = %self.endpoint,
                        "step: no handler matched"
                    );
                    return Ok(HandlerResponse::Unhandled);
                }
                return Ok(HandlerResponse::Empty);
            };
            self.cursor += 1;
            debug!(
                user_id = self.user_id(),
                endpoint = %self.endpoint,
                position = self.cursor,
                chain_len = chain.len(),
                handler = %handler.name(),
                "step: handler invoked"
            );
            handler.handle(self).await
        })
    }

    /// Pops the current frame and replays the one below it as a fresh dispatch. Empty result
    /// when nothing remains. Fails with [`GbotError::NavigationLoop`] when the replay would
    /// revisit an endpoint already replayed in this traversal or exceed the hop limit.
    pub fn back(&mut self) -> BoxFuture<'_, Result<HandlerResponse>> {
        Box::pin(async move {
            if self.user_state.stack.is_empty() {
                return Ok(HandlerResponse::Empty);
            }
            self.clean_state();
            let Some(frame) = self.user_state.top().cloned() else {
                debug!(user_id = self.user_id(), "step: back emptied the stack");
                return Ok(HandlerResponse::Empty);
            };

            let hops = self.trail.hops + 1;
            if hops > self.router.config().max_back_hops
                || self.trail.replayed.contains(&frame.endpoint)
            {
                warn!(
                    user_id = self.user_id(),
                    endpoint = %frame.endpoint,
                    hops = hops,
                    "Back traversal stopped: navigation loop"
                );
                return Err(GbotError::NavigationLoop {
                    endpoint: frame.endpoint,
                    hops,
                });
            }

            let mut trail = self.trail.clone();
            trail.hops = hops;
            trail.replayed.insert(frame.endpoint.clone());
            info!(
                user_id = self.user_id(),
                endpoint = %frame.endpoint,
                hops = hops,
                "step: replaying previous frame"
            );
            let mut previous = Context::replay(Arc::clone(&self.router), &frame, trail);
            previous.next().await
        })
    }

    /// Drops the sender's most recent frame.
    pub fn clean_state(&mut self) {
        self.user_state = self.router.store().pop(self.user_id());
    }

    /// Redirects the sender's next unmatched event to `pending`, replacing any earlier one.
    pub fn set_next_state(&mut self, pending: PendingState) {
        self.router.store().set_next(self.user_id(), pending.clone());
        self.user_state.next = Some(pending);
    }

    /// Forgets the sender's history and pending redirection.
    pub fn reset_user_stack(&mut self) {
        self.router.reset_user(self.user_id());
        self.user_state = UserState::default();
    }

    fn chain(&mut self) -> Chain {
        if let Some(chain) = &self.chain {
            return Arc::clone(chain);
        }
        let resolved = self.router.resolve(&self.message, &mut self.params);
        self.endpoint = resolved.endpoint;
        self.source = Some(resolved.source);
        self.user_state = resolved.user_state;
        self.chain = Some(Arc::clone(&resolved.chain));
        resolved.chain
    }
}
