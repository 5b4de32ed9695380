//! Collaborator traits the host relay implements.
//!
//! The responder never owns an outbound connection; it holds `Arc<dyn Owner>`
//! handles supplied by the host and queries them at resolution time. The
//! directory is an injected capability so the resolver depends on no global
//! state.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Stable identity of an owner for registry membership.
///
/// Allocated by the host; the responder only compares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live socket addressing of an owner's outbound connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerAddressing {
    /// Address the outbound socket bound locally.
    pub local_ip: IpAddr,
    /// Port the outbound socket bound locally.
    pub local_port: u16,
    /// Remote server address connected to.
    pub remote_ip: IpAddr,
    /// Remote server port connected to (e.g. 6667).
    pub remote_port: u16,
}

/// One in-flight outbound connection attempt, as seen by the responder.
///
/// Implemented by the host relay. Addressing is queried live on every
/// resolution because the bound ports are unknown until the outbound socket
/// has actually connected.
pub trait Owner: Send + Sync {
    /// Registry membership key.
    fn id(&self) -> OwnerId;

    /// Rendering for the admin surface, `<account>/<connection-name>`.
    fn label(&self) -> String;

    /// Identity string reported verbatim in `USERID` replies.
    fn identity(&self) -> String;

    /// Current socket addressing, or `None` while the outbound connection is
    /// not established.
    fn addressing(&self) -> Option<OwnerAddressing>;
}

/// Global enumeration of owners across all accounts the host manages.
///
/// The matching scan covers every owner the host knows, not just those
/// registered for listener lifecycle.
pub trait OwnerDirectory: Send + Sync {
    /// Snapshot of all known owners. Cloned `Arc`s, so an owner going away
    /// mid-scan cannot invalidate the iteration.
    fn owners(&self) -> Vec<Arc<dyn Owner>>;
}
