//! Unit test module
//!
//! Middleware unit tests live here, separate from source files.
//! Tests drive middleware through a real router and its public API.

mod logging_auth_middleware_test;
