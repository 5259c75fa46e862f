//! # Handler chain
//!
//! Routes each inbound [`gbot_core::Message`] to an endpoint's handler chain and keeps a per-user
//! navigation stack for multi-step flows.
//!
//! The executable chain of a dispatch is `middleware ++ endpoint handlers` (or the default
//! handler when nothing matched). [`Context::next`] runs exactly one entry; each handler decides
//! whether to continue by calling `next()` again. [`Context::back`] pops the sender's current
//! frame and replays the previous one as a fresh dispatch. [`Context::set_next_state`] captures
//! the sender's next unmatched event for a given endpoint.
//!
//! ```ignore
//! let router = Router::builder()
//!     .use_middleware(LoggingMiddleware)
//!     .handle("/ask-name", AskName)
//!     .handle("/got-name", GotName)
//!     .back_endpoint("/back")
//!     .build();
//! router.dispatch(message).await?;
//! ```

mod context;
mod handler;
mod registry;
mod resolve;
mod router;
mod state;

pub use context::Context;
pub use handler::{BackHandler, Handler};
pub use registry::{Chain, ChainSource, HandlerRegistry};
pub use resolve::{parse_query, resolve_endpoint, split_endpoint, Resolution};
pub use router::{Router, RouterBuilder, RouterConfig, DEFAULT_BACK_ENDPOINT, DEFAULT_MAX_BACK_HOPS};
pub use state::{PendingState, State, StateStore, UserState};

// Integration tests live in tests/.
