//! DNS Module Tests
//!
//! Covers:
//! - `Name` struct
//! - Target grammar helpers
//! - `GaiResolver` (Basic System Resolver)

use netdiag::dns::target::{is_single_label, reverse_pointer, strip_root};
use netdiag::dns::{is_ip_address, is_valid_target, DnsServer, GaiResolver, Name, Resolve};

use std::net::{IpAddr, Ipv4Addr};

#[test]
fn test_name_api() {
    let name = Name::new("example.com");
    assert_eq!(name.as_str(), "example.com");
    assert_eq!(name.to_string(), "example.com");
}

#[test]
fn test_ip_classification() {
    assert!(is_ip_address("8.8.8.8"));
    assert!(!is_ip_address("8.8.8"));
    assert!(is_ip_address("::1"));
    assert!(!is_ip_address("example.com"));
}

#[test]
fn test_target_validation() {
    for good in ["example.com", "host-1", "my_host.lan", "8.8.8.8", "bücher.de"] {
        assert!(is_valid_target(good), "{good}");
    }
    for bad in ["", "a;b", "a|b", "a b", "a&&b", "$(id)", "bücher.de\n"] {
        assert!(!is_valid_target(bad), "{bad}");
    }
}

#[test]
fn test_single_label() {
    assert!(is_single_label("printer"));
    assert!(!is_single_label("printer.lan"));
    assert!(!is_single_label("::1"));
}

#[test]
fn test_reverse_names() {
    assert_eq!(
        reverse_pointer(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))),
        "8.8.8.8.in-addr.arpa"
    );
    assert_eq!(
        reverse_pointer("2001:db8::1".parse().unwrap()),
        "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
    );
    assert_eq!(strip_root("dns.google."), "dns.google");
    assert_eq!(strip_root("dns.google"), "dns.google");
}

#[test]
fn test_dns_server_parse() {
    assert_eq!(DnsServer::parse(""), DnsServer::SystemDefault);
    assert_eq!(DnsServer::parse("System Default"), DnsServer::SystemDefault);
    assert_eq!(
        DnsServer::parse(" 1.1.1.1 "),
        DnsServer::Ip(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)))
    );
    assert_eq!(
        DnsServer::parse("dns.google"),
        DnsServer::Hostname("dns.google".into())
    );
    assert_eq!(DnsServer::parse("dns.google").to_string(), "dns.google");
}

#[tokio::test]
async fn test_gai_resolver_localhost() {
    let resolver = GaiResolver::new();
    let result = resolver.resolve(Name::new("localhost")).await;

    // Some sandboxes have no resolver configuration at all.
    if let Ok(addrs) = result {
        let list: Vec<_> = addrs.collect();
        assert!(!list.is_empty());
    } else {
        println!("Warning: localhost resolution failed: {:?}", result.err());
    }
}

#[tokio::test]
async fn test_gai_resolver_rejects_invalid_tld() {
    let resolver = GaiResolver::new();
    assert!(resolver.resolve(Name::new("nothing.invalid")).await.is_err());
}
