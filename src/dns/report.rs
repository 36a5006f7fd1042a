//! Text rendering of lookup results, and the reverse direction: pulling
//! names and addresses back out of rendered or captured lookup text.

use super::resolver::ResolutionResult;
use crate::base::neterror::NetError;

pub const NOT_FOUND_STATUS: &str = "Status: Hostname does not exist or could not be resolved.";

/// Renders a forward lookup as `Name:` / `Address:` / `Aliases:` lines.
pub fn render(result: &ResolutionResult) -> String {
    let mut lines = Vec::new();
    if let Some(notes) = &result.notes {
        lines.push(notes.clone());
    }
    lines.push(format!("Name: {}", result.display_name()));
    for address in &result.addresses {
        lines.push(format!("Address: {address}"));
    }
    if !result.aliases.is_empty() {
        lines.push(format!("Aliases: {}", result.aliases.join(", ")));
    }
    if result.is_empty() {
        lines.push(NOT_FOUND_STATUS.to_string());
    }
    lines.join("\n")
}

/// Renders a resolution that stopped with an error before any query.
pub fn render_failure(target: &str, message: &str) -> String {
    format!("{message}\nName: {target}\n{NOT_FOUND_STATUS}")
}

/// One-line description of a resolution that stopped with an error.
pub fn error_note(error: &NetError) -> String {
    match error {
        NetError::DnsServerUnresolvable { .. } => format!("Error: {error}"),
        _ => format!("Error during DNS resolution: {error}"),
    }
}

/// Renders a successful reverse lookup.
pub fn render_reverse(ip: &str, name: &str) -> String {
    format!("Name: {name}\nAddress: {ip}")
}

/// Renders a reverse lookup that produced no name.
pub fn render_reverse_missing(ip: &str, reason: &str) -> String {
    format!(
        "Name: {ip}\nAddress: {ip}\nStatus: No reverse DNS (PTR) record found for this IP. ({reason})"
    )
}

/// Every dotted-decimal value following `Address: ` in `text`, in order.
///
/// Works on both rendered reports and raw `nslookup` output. The tab-separated
/// server line `nslookup` prints first is not matched.
pub fn extract_addresses(text: &str) -> Vec<String> {
    text.match_indices("Address: ")
        .filter_map(|(at, marker)| {
            let value: String = text[at + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            (!value.is_empty()).then_some(value)
        })
        .collect()
}

/// The first value following `Name: ` in `text`, up to the end of its line.
pub fn extract_name(text: &str) -> Option<String> {
    let start = text.find("Name: ")? + "Name: ".len();
    let name = text[start..].lines().next()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str) -> ResolutionResult {
        ResolutionResult {
            queried_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_plain() {
        let mut r = result("example.com");
        r.addresses = vec!["93.184.216.34".into()];
        assert_eq!(render(&r), "Name: example.com\nAddress: 93.184.216.34");
    }

    #[test]
    fn test_render_alias_chain() {
        let mut r = result("www.example.com");
        r.canonical_name = Some("edge.example.net".into());
        r.aliases = vec!["www.example.com".into()];
        r.addresses = vec!["1.2.3.4".into(), "1.2.3.5".into()];
        assert_eq!(
            render(&r),
            "Name: edge.example.net\nAddress: 1.2.3.4\nAddress: 1.2.3.5\nAliases: www.example.com"
        );
    }

    #[test]
    fn test_render_missing() {
        let mut r = result("nope.example.com");
        r.notes = Some("Note: Appending example.com to single-label hostname 'nope'.".into());
        let text = render(&r);
        assert!(text.starts_with("Note: Appending example.com"));
        assert!(text.contains("Name: nope.example.com"));
        assert!(text.ends_with(NOT_FOUND_STATUS));
    }

    #[test]
    fn test_error_note() {
        let err = NetError::server_unresolvable(
            "dns.corp.invalid",
            std::io::Error::new(std::io::ErrorKind::NotFound, "unknown"),
        );
        assert_eq!(
            error_note(&err),
            "Error: Could not resolve DNS server hostname 'dns.corp.invalid'"
        );
        let err = NetError::InvalidInput { target: "a b".into() };
        assert_eq!(error_note(&err), "Error during DNS resolution: Invalid target 'a b'");
    }

    #[test]
    fn test_extract_from_nslookup_output() {
        let raw = "Server:\t\t8.8.8.8\nAddress:\t8.8.8.8#53\n\nNon-authoritative answer:\n\
                   Name:\texample.com\nAddress: 93.184.216.34\n";
        assert_eq!(extract_addresses(raw), vec!["93.184.216.34"]);
        assert_eq!(extract_name(raw), None);
    }

    #[test]
    fn test_extract_from_report() {
        let text = "Name: edge.example.net\nAddress: 1.2.3.4\nAddress: 1.2.3.5\nAliases: www.example.com";
        assert_eq!(extract_addresses(text), vec!["1.2.3.4", "1.2.3.5"]);
        assert_eq!(extract_name(text).as_deref(), Some("edge.example.net"));
    }
}
