//! Ident query resolution.
//!
//! Maps a request line plus the ident connection's own address pair to the
//! owner whose outbound connection is being asked about. Scans every owner
//! the injected directory enumerates; the listener registry only gates
//! lifecycle, never lookup scope.
//!
//! Tie-breaking is deliberately asymmetric: an exact match is unambiguous and
//! stops the scan, a fallback match is heuristic and keeps scanning so the
//! most recently found one wins.

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use tracing::debug;

use identd_core::addr::addresses_equal;
use identd_core::codec::{ReplyToken, format_reply, invalid_port_reply, parse_request, userid_payload};
use identd_core::constants::ERROR_NO_USER;
use identd_core::owner::OwnerDirectory;

/// Last request/reply pair, kept for the admin surface.
#[derive(Debug, Clone, Default)]
struct LastExchange {
    request: String,
    reply: String,
}

/// The matching algorithm over the host's owner directory.
///
/// Stateless apart from the recorded last exchange; safe to share across
/// accepted-connection tasks.
pub struct Resolver {
    directory: Arc<dyn OwnerDirectory>,
    last: Mutex<LastExchange>,
}

impl Resolver {
    /// Create a resolver over the given owner directory.
    pub fn new(directory: Arc<dyn OwnerDirectory>) -> Self {
        Self {
            directory,
            last: Mutex::new(LastExchange::default()),
        }
    }

    /// Resolve one request line into a reply line (no trailing CRLF).
    ///
    /// `socket_ip` is the address the querying peer connected to (this
    /// listener's side of the ident connection); `remote_ip` is the address
    /// the query came from. Every code path yields a well-formed reply.
    pub fn resolve(&self, line: &str, socket_ip: IpAddr, remote_ip: IpAddr) -> String {
        debug!(request = line, from = %remote_ip, on = %socket_ip, "Ident request");

        let reply = match parse_request(line) {
            Err(_) => invalid_port_reply(),
            Ok(req) => {
                let mut payload = ERROR_NO_USER.to_string();
                let mut token = ReplyToken::Error;

                for owner in self.directory.owners() {
                    // Owners without an established outbound connection have
                    // nothing to match against.
                    let Some(addr) = owner.addressing() else {
                        continue;
                    };

                    debug!(
                        local_port = addr.local_port,
                        remote_port = addr.remote_port,
                        local_ip = %addr.local_ip,
                        "Checking candidate"
                    );

                    if addr.local_port == req.local_port
                        && addr.remote_port == req.remote_port
                        && addresses_equal(addr.local_ip, socket_ip)
                    {
                        token = ReplyToken::UserId;
                        payload = userid_payload(&owner.identity());
                        // exact match found, leave the loop:
                        break;
                    }

                    debug!(
                        remote_ip = %addr.remote_ip,
                        remote_port = addr.remote_port,
                        local_ip = %addr.local_ip,
                        "Checking candidate fallback"
                    );

                    if addr.remote_ip == remote_ip
                        && addr.remote_port == req.remote_port
                        && addresses_equal(addr.local_ip, socket_ip)
                    {
                        token = ReplyToken::UserId;
                        payload = userid_payload(&owner.identity());
                        // keep looping, we may find something better
                    }
                }

                format_reply(req.local_port, req.remote_port, token, &payload)
            }
        };

        debug!(reply = %reply, "Ident response");

        let request = format!(
            "{} from {remote_ip} on {socket_ip}",
            line.replace('\r', "").replace('\n', " ").trim_end()
        );
        let mut last = self.last.lock().unwrap();
        last.request = request;
        last.reply = reply.clone();

        reply
    }

    /// The last recorded request and reply, for the admin surface.
    pub fn last_exchange(&self) -> (String, String) {
        let last = self.last.lock().unwrap();
        (last.request.clone(), last.reply.clone())
    }
}
