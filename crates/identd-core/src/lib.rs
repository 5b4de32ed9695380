//! identd-core: Shared library for the embedded RFC 1413 (ident) responder.
//!
//! This crate provides:
//! - Request/reply line codec for the ident wire protocol
//! - Address comparison with IPv4-mapped IPv6 normalization
//! - Collaborator traits (`Owner`, `OwnerDirectory`) the host relay implements
//! - Error types and logging setup

pub mod addr;
pub mod codec;
pub mod constants;
pub mod error;
pub mod logging;
pub mod owner;

pub use addr::{addresses_equal, ip_strings_equal};
pub use codec::{IdentRequest, ReplyToken, format_reply, parse_request};
pub use error::{Error, Result};
pub use logging::{LogFormat, init_logging};
pub use owner::{Owner, OwnerAddressing, OwnerDirectory, OwnerId};
