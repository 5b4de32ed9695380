//! Address comparison with IPv4-mapped IPv6 normalization.
//!
//! Depending on socket family, the same peer may present as `10.0.0.1` or as
//! the IPv4-mapped form `::ffff:10.0.0.1`. Both comparisons here treat those
//! as equal; nothing else is normalized.

use std::net::IpAddr;

/// Compare two addresses, treating an IPv4-mapped IPv6 address and its plain
/// IPv4 form as equal.
pub fn addresses_equal(a: IpAddr, b: IpAddr) -> bool {
    a.to_canonical() == b.to_canonical()
}

/// String-level variant of [`addresses_equal`] for textual inputs that may
/// not parse as `IpAddr` (hostnames never appear here, but the caller may
/// hold the address pre-rendered).
///
/// Strips one leading `::ffff:` prefix from each operand, then compares.
pub fn ip_strings_equal(a: &str, b: &str) -> bool {
    strip_mapped_prefix(a) == strip_mapped_prefix(b)
}

fn strip_mapped_prefix(s: &str) -> &str {
    s.strip_prefix("::ffff:").unwrap_or(s)
}
