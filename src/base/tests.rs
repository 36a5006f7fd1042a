use crate::base::neterror::NetError;
use crate::dns::RecordKind;
use std::io;

#[test]
fn test_fallback_classification() {
    let timeout = NetError::QueryTimeout {
        name: "example.com".into(),
        kind: RecordKind::A,
    };
    assert!(timeout.triggers_fallback());

    let failed = NetError::QueryFailed {
        name: "example.com".into(),
        kind: RecordKind::A,
        message: "io error".into(),
    };
    assert!(failed.triggers_fallback());
    assert!(NetError::ResolverTaskFailed.triggers_fallback());
}

#[test]
fn test_caller_errors_do_not_fall_back() {
    let invalid = NetError::InvalidInput {
        target: "a;b".into(),
    };
    assert!(!invalid.triggers_fallback());

    let server = NetError::server_unresolvable(
        "dns.corp.invalid",
        io::Error::new(io::ErrorKind::NotFound, "unknown host"),
    );
    assert!(!server.triggers_fallback());
}

#[test]
fn test_error_messages() {
    let err = NetError::QueryTimeout {
        name: "example.com".into(),
        kind: RecordKind::Cname,
    };
    assert_eq!(err.to_string(), "CNAME query for example.com timed out");

    let err = NetError::server_unresolvable(
        "dns.corp.invalid",
        io::Error::new(io::ErrorKind::NotFound, "unknown host"),
    );
    assert_eq!(
        err.to_string(),
        "Could not resolve DNS server hostname 'dns.corp.invalid'"
    );
}
