use std::net::Ipv4Addr;

/// Largest radius honoured; larger values are clamped to it.
pub const MAX_NEIGHBOR_RADIUS: u32 = 1024;

/// The IPv4 addresses within `radius` of `ip`, lowest first, `ip` excluded.
/// Offsets that would leave the IPv4 range are skipped.
pub fn neighbor_addresses(ip: Ipv4Addr, radius: u32) -> Vec<Ipv4Addr> {
    let base = i64::from(u32::from(ip));
    let radius = i64::from(radius.min(MAX_NEIGHBOR_RADIUS));

    (-radius..=radius)
        .filter(|offset| *offset != 0)
        .filter_map(|offset| u32::try_from(base + offset).ok())
        .map(Ipv4Addr::from)
        .collect()
}
