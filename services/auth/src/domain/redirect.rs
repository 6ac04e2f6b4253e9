//! Callback URL allow-listing.

use url::{Host, Url};

/// Decide whether `url` may be used as the landing page of a verification
/// link for a project.
///
/// Accepts `http`/`https` URLs whose host equals, or is a subdomain of, an
/// entry in `allowed_domains`. Entries are either bare domains
/// (`example.com`, `*.example.com`) or origins (`https://example.com:8443`);
/// origin entries also pin the scheme and port. With `allow_localhost`,
/// loopback hosts are accepted regardless of the list. Malformed input is
/// rejected, never propagated.
pub fn is_allowed(url: &str, allowed_domains: &[String], allow_localhost: bool) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host() else {
        return false;
    };
    if allow_localhost && is_loopback(&host) {
        return true;
    }
    allowed_domains
        .iter()
        .any(|entry| matches_entry(&url, entry.trim()))
}

fn is_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    }
}

fn matches_entry(url: &Url, entry: &str) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if entry.is_empty() {
        return false;
    }
    if !entry.contains("://") {
        return host_matches(host, entry);
    }
    let Ok(origin) = Url::parse(entry) else {
        return false;
    };
    let Some(origin_host) = origin.host_str() else {
        return false;
    };
    origin.scheme() == url.scheme()
        && origin.port_or_known_default() == url.port_or_known_default()
        && host_matches(host, origin_host)
}

/// `example.com` matches itself and any subdomain; `*.example.com` matches
/// subdomains only.
fn host_matches(host: &str, pattern: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    let (domain, subdomains_only) = match pattern.strip_prefix("*.") {
        Some(rest) => (rest, true),
        None => (pattern.as_str(), false),
    };
    if domain.is_empty() {
        return false;
    }
    let is_subdomain = host
        .strip_suffix(domain)
        .is_some_and(|prefix| prefix.len() > 1 && prefix.ends_with('.'));
    is_subdomain || (!subdomains_only && host == domain)
}
