//! Router: frozen registry, navigation store and the dispatch entry points.

use std::sync::Arc;

use gbot_core::{decode_message, Dispatcher, GbotError, HandlerResponse, Message, Params, Result};
use tracing::{debug, error, info, instrument};

use crate::context::Context;
use crate::handler::{BackHandler, Handler};
use crate::registry::{Chain, ChainSource, HandlerRegistry};
use crate::resolve::{resolve_endpoint, Resolution};
use crate::state::{State, StateStore, UserState};

pub const DEFAULT_BACK_ENDPOINT: &str = "/back";
pub const DEFAULT_MAX_BACK_HOPS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Endpoint never pushed onto the navigation stack.
    pub back_endpoint: String,
    /// Upper bound on replays within one back traversal.
    pub max_back_hops: usize,
    /// Oldest frames are dropped beyond this depth. Unbounded when `None`.
    pub max_stack_depth: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            back_endpoint: DEFAULT_BACK_ENDPOINT.to_string(),
            max_back_hops: DEFAULT_MAX_BACK_HOPS,
            max_stack_depth: None,
        }
    }
}

impl RouterConfig {
    /// Back endpoint must be a path; hop and depth limits must be at least 1.
    pub fn validate(&self) -> Result<()> {
        if !self.back_endpoint.starts_with('/') {
            return Err(GbotError::Config(format!(
                "back endpoint must start with '/': {}",
                self.back_endpoint
            )));
        }
        if self.max_back_hops == 0 {
            return Err(GbotError::Config("max back hops must be at least 1".to_string()));
        }
        if self.max_stack_depth == Some(0) {
            return Err(GbotError::Config(
                "max stack depth must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Registration phase. [`build`](Self::build) freezes everything into an `Arc<Router>`.
#[derive(Default)]
pub struct RouterBuilder {
    registry: HandlerRegistry,
    config: RouterConfig,
    back_route: Option<String>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to `endpoint`'s chain.
    pub fn handle<H: Handler + 'static>(self, endpoint: impl Into<String>, handler: H) -> Self {
        self.handle_arc(endpoint, Arc::new(handler))
    }

    pub fn handle_arc(mut self, endpoint: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.registry.handle(endpoint, handler);
        self
    }

    /// Appends a global middleware; middleware run before every non-empty chain.
    pub fn use_middleware<H: Handler + 'static>(self, handler: H) -> Self {
        self.use_middleware_arc(Arc::new(handler))
    }

    pub fn use_middleware_arc(mut self, handler: Arc<dyn Handler>) -> Self {
        self.registry.use_middleware(handler);
        self
    }

    /// Handler for events that match nothing.
    pub fn default_handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.registry.set_default(Arc::new(handler));
        self
    }

    /// Registers [`BackHandler`] under `endpoint` and makes it the back endpoint.
    pub fn back_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.back_route = Some(endpoint.into());
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Arc<Router> {
        let RouterBuilder {
            mut registry,
            mut config,
            back_route,
            dispatcher,
        } = self;
        if let Some(endpoint) = back_route {
            registry.handle(endpoint.clone(), Arc::new(BackHandler));
            config.back_endpoint = endpoint;
        }
        info!(
            endpoints = registry.endpoints().count(),
            middleware = registry.middleware().len(),
            has_default = registry.default_handler().is_some(),
            back_endpoint = %config.back_endpoint,
            "Router built"
        );
        Arc::new(Router {
            registry,
            store: StateStore::new(),
            config,
            dispatcher,
        })
    }
}

/// Outcome of resolving one dispatch against registry and navigation state.
pub(crate) struct ResolvedChain {
    pub endpoint: String,
    pub chain: Chain,
    pub source: ChainSource,
    pub user_state: UserState,
}

pub struct Router {
    registry: HandlerRegistry,
    store: StateStore,
    config: RouterConfig,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> Option<&Arc<dyn Dispatcher>> {
        self.dispatcher.as_ref()
    }

    /// Runs one decoded event: builds a fresh [`Context`] and returns its first `next()`.
    #[instrument(skip(self, message), fields(user_id = message.sender_id(), chat_id = message.chat_id))]
    pub async fn dispatch(self: &Arc<Self>, message: Message) -> Result<HandlerResponse> {
        info!(
            message_type = %message.message_type(),
            text = %message.text,
            "step: dispatch started"
        );
        let mut ctx = Context::new(Arc::clone(self), Arc::new(message));
        let result = ctx.next().await;
        match &result {
            Ok(response) => info!(
                endpoint = %ctx.endpoint(),
                source = ?ctx.source(),
                response = ?response,
                "step: dispatch finished"
            ),
            Err(e) => error!(endpoint = %ctx.endpoint(), error = %e, "Dispatch failed"),
        }
        result
    }

    /// Decodes a raw event and dispatches it. Decode errors return before any handler runs.
    pub async fn dispatch_raw(self: &Arc<Self>, raw: &[u8]) -> Result<HandlerResponse> {
        let message = decode_message(raw).map_err(|e| {
            error!(error = %e, "Failed to decode inbound event");
            e
        })?;
        self.dispatch(message).await
    }

    /// Clears the navigation state of `user_id`.
    pub fn reset_user(&self, user_id: i64) {
        self.store.reset(user_id);
    }

    /// Resolves endpoint and chain, pushing the navigation frame and consuming the pending next
    /// state in one atomic update of the sender's entry. Merges resolved params into `params`.
    pub(crate) fn resolve(&self, message: &Arc<Message>, params: &mut Params) -> ResolvedChain {
        let Resolution {
            endpoint,
            params: extra,
        } = resolve_endpoint(message);
        params.extend(extra);

        let registered = self.registry.handlers(&endpoint);
        let push = endpoint != self.config.back_endpoint;
        let max_depth = self.config.max_stack_depth;
        let frame_params = params.clone();

        let (user_state, pending) = self.store.update(message.sender_id(), |state| {
            if push {
                state.push_dedup(
                    State {
                        endpoint: endpoint.clone(),
                        message: Arc::clone(message),
                        params: frame_params,
                    },
                    max_depth,
                );
            }
            let pending = if registered.is_none() {
                state.next.take()
            } else {
                None
            };
            (state.clone(), pending)
        });

        let (resolved, source) = match (registered, pending) {
            (Some(chain), _) => (Some(chain), ChainSource::Registry),
            (None, Some(pending)) => {
                debug!(
                    endpoint = %endpoint,
                    next_endpoint = %pending.endpoint,
                    "step: redirected by pending next state"
                );
                params.extend(pending.params);
                (
                    self.registry.handlers(&pending.endpoint),
                    ChainSource::PendingNext,
                )
            }
            (None, None) => (None, ChainSource::Empty),
        };
        let (chain, source) = self.registry.executable_chain(resolved, source);

        debug!(
            endpoint = %endpoint,
            source = ?source,
            chain_len = chain.len(),
            depth = user_state.depth(),
            "step: handler chain resolved"
        );

        ResolvedChain {
            endpoint,
            chain,
            source,
            user_state,
        }
    }
}
