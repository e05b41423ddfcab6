//! Machine address resolution.

use std::net::{IpAddr, ToSocketAddrs};

use crate::error::FleetError;

/// Canonical address for `host`: IP literals pass through, names resolve to
/// their first IPv4 address (falling back to the first address of any family).
pub fn resolve_machine(host: &str) -> Result<IpAddr, FleetError> {
    let host = host.trim();
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let addrs: Vec<IpAddr> = (host, 0)
        .to_socket_addrs()
        .map_err(|e| FleetError::AddressResolution {
            host: host.to_string(),
            reason: e.to_string(),
        })?
        .map(|a| a.ip())
        .collect();
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| FleetError::AddressResolution {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        })
}

/// Whether a registration's reported address is `machine`.
pub fn same_machine(reported: &str, machine: IpAddr) -> bool {
    match reported.trim().parse::<IpAddr>() {
        Ok(ip) => ip == machine,
        Err(_) => reported.trim() == machine.to_string(),
    }
}
