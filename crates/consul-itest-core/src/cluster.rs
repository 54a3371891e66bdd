// crates/consul-itest-core/src/cluster.rs
// ============================================================================
// Module: Cluster Address Helpers
// Description: Raft address handling for leader and peer checks.
// Purpose: Map raft addresses to pod IPs and judge leader reelection.
// Dependencies: std
// ============================================================================

//! Raft address handling for leader and peer checks.

/// Removes the trailing `:port` from a raft address.
///
/// Bracketed IPv6 hosts lose their brackets. Addresses without a numeric port
/// are returned unchanged.
#[must_use]
pub fn strip_port(address: &str) -> &str {
    let Some((host, port)) = address.rsplit_once(':') else {
        return address;
    };
    if port.is_empty() || !port.bytes().all(|byte| byte.is_ascii_digit()) {
        return address;
    }
    if let Some(inner) = host.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return inner;
    }
    if host.contains(':') {
        // Unbracketed IPv6 literal without a port.
        return address;
    }
    host
}

/// Returns true when `new_leader` is a current peer and differs from `old_leader`.
#[must_use]
pub fn is_leader_reelected(new_leader: &str, old_leader: &str, peers: &[String]) -> bool {
    !new_leader.is_empty() && new_leader != old_leader && peers.iter().any(|peer| peer == new_leader)
}

/// Returns the pod IPs of every peer.
#[must_use]
pub fn peer_ips(peers: &[String]) -> Vec<String> {
    peers.iter().map(|peer| strip_port(peer).to_string()).collect()
}
