//! HTTP API: routing, authentication, admission, and response mapping.

pub mod app;
pub mod context;
pub mod middleware;
