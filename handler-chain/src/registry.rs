//! Endpoint → handler chain mapping, global middleware and the default handler.
//!
//! Filled by [`crate::RouterBuilder`] during startup and read-only once the router is built.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::Handler;

/// Immutable executable chain of one dispatch.
pub type Chain = Arc<[Arc<dyn Handler>]>;

/// What decided the handler chain of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSource {
    /// The resolved endpoint is registered.
    Registry,
    /// The endpoint is not registered; the sender's pending next state redirected it.
    PendingNext,
    /// Nothing matched; the default handler runs.
    Default,
    /// Nothing matched and there is no default handler.
    Empty,
}

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Arc<dyn Handler>>>,
    middleware: Vec<Arc<dyn Handler>>,
    default_handler: Option<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the chain of `endpoint`.
    pub fn handle(&mut self, endpoint: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.entry(endpoint.into()).or_default().push(handler);
    }

    pub fn use_middleware(&mut self, handler: Arc<dyn Handler>) {
        self.middleware.push(handler);
    }

    pub fn set_default(&mut self, handler: Arc<dyn Handler>) {
        self.default_handler = Some(handler);
    }

    /// Registered chain of `endpoint`; `None` when absent or empty.
    pub fn handlers(&self, endpoint: &str) -> Option<&[Arc<dyn Handler>]> {
        self.handlers
            .get(endpoint)
            .map(Vec::as_slice)
            .filter(|chain| !chain.is_empty())
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.handlers(endpoint).is_some()
    }

    pub fn middleware(&self) -> &[Arc<dyn Handler>] {
        &self.middleware
    }

    pub fn default_handler(&self) -> Option<&Arc<dyn Handler>> {
        self.default_handler.as_ref()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Middleware followed by `resolved`, or by the default handler when nothing resolved.
    /// Empty (middleware included) when neither exists.
    pub fn executable_chain(
        &self,
        resolved: Option<&[Arc<dyn Handler>]>,
        source: ChainSource,
    ) -> (Chain, ChainSource) {
        let (tail, source): (Vec<Arc<dyn Handler>>, ChainSource) = match resolved {
            Some(chain) => (chain.to_vec(), source),
            None => match &self.default_handler {
                Some(default) => (vec![Arc::clone(default)], ChainSource::Default),
                None => return (Arc::from(Vec::new()), ChainSource::Empty),
            },
        };
        let chain: Vec<Arc<dyn Handler>> = self.middleware.iter().cloned().chain(tail).collect();
        (Arc::from(chain), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use async_trait::async_trait;
    use gbot_core::{HandlerResponse, Result};

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn handle(&self, _ctx: &mut Context) -> Result<HandlerResponse> {
            Ok(HandlerResponse::Empty)
        }
    }

    #[test]
    fn test_handle_appends() {
        let mut registry = HandlerRegistry::new();
        registry.handle("/a", Arc::new(Noop));
        registry.handle("/a", Arc::new(Noop));
        assert_eq!(registry.handlers("/a").map(<[_]>::len), Some(2));
        assert!(registry.handlers("/b").is_none());
        assert!(registry.contains("/a"));
        assert_eq!(registry.endpoints().collect::<Vec<_>>(), vec!["/a"]);
    }

    #[test]
    fn test_executable_chain_prepends_middleware() {
        let mut registry = HandlerRegistry::new();
        registry.use_middleware(Arc::new(Noop));
        registry.handle("/a", Arc::new(Noop));
        let (chain, source) =
            registry.executable_chain(registry.handlers("/a"), ChainSource::Registry);
        assert_eq!(chain.len(), 2);
        assert_eq!(source, ChainSource::Registry);
    }

    #[test]
    fn test_executable_chain_uses_default() {
        let mut registry = HandlerRegistry::new();
        registry.use_middleware(Arc::new(Noop));
        let (chain, source) = registry.executable_chain(None, ChainSource::Registry);
        assert!(chain.is_empty());
        assert_eq!(source, ChainSource::Empty);

        registry.set_default(Arc::new(Noop));
        let (chain, source) = registry.executable_chain(None, ChainSource::Registry);
        assert_eq!(chain.len(), 2);
        assert_eq!(source, ChainSource::Default);
    }
}
