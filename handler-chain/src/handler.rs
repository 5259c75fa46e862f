//! Handler trait and the built-in back handler.

use async_trait::async_trait;
use gbot_core::{HandlerResponse, Result};
use tracing::info;

use crate::context::Context;

/// One entry of a handler chain: middleware, endpoint handler or default handler alike.
///
/// A handler that wants the rest of the chain to run calls [`Context::next`] itself; returning
/// without calling it ends the dispatch with the returned value.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Pops the sender's current frame and replays the previous one. Registered by
/// [`crate::RouterBuilder::back_endpoint`].
pub struct BackHandler;

#[async_trait]
impl Handler for BackHandler {
    async fn handle(&self, ctx: &mut Context) -> Result<HandlerResponse> {
        info!(
            user_id = ctx.user_id(),
            depth = ctx.user_state().depth(),
            "step: back requested"
        );
        ctx.back().await
    }
}
