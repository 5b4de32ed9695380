//! Protocol and configuration constants for identd.

use std::time::Duration;

// =============================================================================
// Protocol Constants
// =============================================================================

/// Default port the ident listener binds to.
///
/// RFC 1413 assigns port 113, but a relay running unprivileged typically sits
/// behind a NAT/firewall redirect, so the default is a high port.
pub const DEFAULT_IDENT_PORT: u16 = 11300;

/// Maximum accepted request-line length in bytes.
///
/// RFC 1413 lines are two decimal ports and a comma; anything past this cap
/// is abuse, not protocol.
pub const MAX_REQUEST_LINE: usize = 1024;

/// Reply token for a resolved query.
pub const TOKEN_USERID: &str = "USERID";

/// Reply token for a failed query.
pub const TOKEN_ERROR: &str = "ERROR";

/// Error payload for a malformed request line.
pub const ERROR_INVALID_PORT: &str = "INVALID-PORT";

/// Error payload for a well-formed query with no matching owner.
pub const ERROR_NO_USER: &str = "NO-USER";

/// Operating-system token in `USERID` payloads.
pub const OS_TOKEN: &str = "UNIX";

// =============================================================================
// Timing Constants
// =============================================================================

/// Idle cap on reading the single request line from an accepted connection.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
