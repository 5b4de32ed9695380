//! identd-server: On-demand RFC 1413 (ident) responder for a multi-tenant relay.
//!
//! The responder listens only while at least one outbound connection attempt
//! is registered as needing ident support. Each accepted connection gets one
//! request line, one CRLF-terminated reply, then a close.
//!
//! - [`IdentService`] - ref-counted listener lifecycle and owner registry
//! - [`Resolver`] - the matching algorithm over the host's owner directory
//! - [`IdentConfig`] - bind address, port, and per-connection limits

pub mod admin;
pub mod config;
pub mod handler;
pub mod resolver;
pub mod service;

pub use config::IdentConfig;
pub use resolver::Resolver;
pub use service::{IdentService, IdentStatus, ListenerStatus, RegisterOutcome};
