//! Line codec for the ident wire protocol.
//!
//! Pure functions, no state: parsing the inbound query line and formatting
//! the reply line. Kept separate from the resolver so both directions are
//! testable without the matching algorithm or any network I/O.
//!
//! Request: `<local-port> , <remote-port>` (whitespace-tolerant).
//! Reply: `<lport>, <rport> : <TOKEN> : <payload>`.

use std::fmt;

use crate::constants::{ERROR_INVALID_PORT, OS_TOKEN, TOKEN_ERROR, TOKEN_USERID};
use crate::error::{Error, Result};

/// A parsed ident request: the port pair as seen by the querying peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentRequest {
    /// Port our side bound when connecting out (the peer's remote port).
    pub local_port: u16,
    /// Port on the peer's side that was connected to (e.g. 6667).
    pub remote_port: u16,
}

/// Reply token in the third field of a response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyToken {
    /// Query resolved to an identity.
    UserId,
    /// Query failed; payload carries the error token.
    Error,
}

impl fmt::Display for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyToken::UserId => f.write_str(TOKEN_USERID),
            ReplyToken::Error => f.write_str(TOKEN_ERROR),
        }
    }
}

/// Parse one request line into its port pair.
///
/// Accepts exactly two comma-separated decimal integers, with any amount of
/// whitespace around the numbers and the comma. Anything else (wrong arity,
/// non-numeric text, values outside u16) is a parse error.
pub fn parse_request(line: &str) -> Result<IdentRequest> {
    let mut fields = line.split(',');

    let (Some(local), Some(remote), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(Error::Parse {
            message: format!("expected two comma-separated ports, got {line:?}"),
        });
    };

    let local_port = parse_port(local)?;
    let remote_port = parse_port(remote)?;

    Ok(IdentRequest {
        local_port,
        remote_port,
    })
}

fn parse_port(field: &str) -> Result<u16> {
    field.trim().parse::<u16>().map_err(|_| Error::Parse {
        message: format!("invalid port {:?}", field.trim()),
    })
}

/// Format a reply line (without the trailing CRLF).
pub fn format_reply(local_port: u16, remote_port: u16, token: ReplyToken, payload: &str) -> String {
    format!("{local_port}, {remote_port} : {token} : {payload}")
}

/// The fixed reply for a request line that did not parse.
pub fn invalid_port_reply() -> String {
    format_reply(0, 0, ReplyToken::Error, ERROR_INVALID_PORT)
}

/// Format the `USERID` payload for a resolved identity.
///
/// The identity string is opaque to this subsystem; it is reported verbatim.
pub fn userid_payload(identity: &str) -> String {
    format!("{OS_TOKEN} : {identity}")
}
