//! Global middleware for the handler chain: request logging and an optional user allowlist.
//!
//! Register with [`handler_chain::RouterBuilder::use_middleware`]; middleware run before the
//! endpoint handlers of every matched or defaulted event.

mod logging_auth;

pub use logging_auth::{AuthMiddleware, LoggingMiddleware};

#[cfg(test)]
mod test;
