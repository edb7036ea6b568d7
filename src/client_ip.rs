use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;

/// Address of the visitor behind the connection.
///
/// `X-Forwarded-For` is only believed when the peer is a trusted proxy. The
/// list is walked from the right, skipping trusted hops, so entries a client
/// prepends itself are never reached while a proxy hop is untrusted.
pub fn client_ip(headers: &HeaderMap, peer: IpAddr, trusted_proxies: &[IpNet]) -> IpAddr {
    let trusted = |ip: &IpAddr| trusted_proxies.iter().any(|net| net.contains(ip));

    if !trusted(&peer) {
        return peer;
    }

    let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) else {
        return peer;
    };

    for hop in xff.rsplit(',').map(str::trim) {
        match hop.parse::<IpAddr>() {
            Ok(ip) if trusted(&ip) => continue,
            Ok(ip) => return ip,
            Err(_) => break,
        }
    }
    peer
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(xff: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(xff).unwrap());
        headers
    }

    fn proxies() -> Vec<IpNet> {
        vec!["10.0.0.0/8".parse().unwrap()]
    }

    #[test]
    fn untrusted_peer_is_the_client() {
        let peer: IpAddr = "198.51.100.7".parse().unwrap();
        assert_eq!(client_ip(&headers("203.0.113.1"), peer, &proxies()), peer);
    }

    #[test]
    fn trusted_peer_yields_forwarded_client() {
        let peer: IpAddr = "10.0.0.2".parse().unwrap();
        let ip = client_ip(&headers("203.0.113.1, 10.0.0.5"), peer, &proxies());
        assert_eq!(ip, "203.0.113.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn spoofed_leftmost_entry_is_ignored() {
        let peer: IpAddr = "10.0.0.2".parse().unwrap();
        let ip = client_ip(&headers("1.2.3.4, 203.0.113.1"), peer, &proxies());
        assert_eq!(ip, "203.0.113.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn no_proxies_configured_ignores_header() {
        let peer: IpAddr = "10.0.0.2".parse().unwrap();
        assert_eq!(client_ip(&headers("203.0.113.1"), peer, &[]), peer);
    }

    #[test]
    fn garbage_header_falls_back_to_peer() {
        let peer: IpAddr = "10.0.0.2".parse().unwrap();
        assert_eq!(client_ip(&headers("not-an-ip"), peer, &proxies()), peer);
    }
}
