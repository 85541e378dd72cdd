// Indicator extraction from TXT strings

use crate::result::TxtRecords;
use regex::Regex;
use std::sync::LazyLock;

static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap());

// Labels may start with '_' so SPF/DKIM style names (`_spf.google.com`) survive.
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[a-z0-9_](?:[a-z0-9_-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\b").unwrap()
});

/// Extract IPv4 addresses and domain names from raw TXT strings.
///
/// Both lists keep first-seen order without duplicates. Domains are
/// lowercased; IPv4 matches with an octet above 255 are dropped.
pub fn parse_txt_from_strings<S: AsRef<str>>(txts: &[S]) -> TxtRecords {
    let mut out = TxtRecords::default();

    for txt in txts {
        let txt = txt.as_ref();
        out.raw.push(txt.to_string());

        for m in IPV4_RE.find_iter(txt) {
            let ip = m.as_str();
            if ip.parse::<std::net::Ipv4Addr>().is_ok() && !out.ips.iter().any(|i| i == ip) {
                out.ips.push(ip.to_string());
            }
        }

        for m in DOMAIN_RE.find_iter(txt) {
            let domain = m.as_str().to_lowercase();
            if !out.domains.contains(&domain) {
                out.domains.push(domain);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_txt_from_strings_basic() {
        let txts = [
            "v=spf1 include:_spf.google.com ip4:198.51.100.23 -all",
            "some text mail.example.com another.example.org",
        ];
        let out = parse_txt_from_strings(&txts);

        assert!(out.ips.contains(&"198.51.100.23".to_string()));
        assert!(out.domains.contains(&"mail.example.com".to_string()));
        assert!(out.domains.contains(&"another.example.org".to_string()));
        assert!(out.domains.contains(&"_spf.google.com".to_string()));
        assert_eq!(out.raw.len(), 2);
    }

    #[test]
    fn test_ip_is_not_a_domain() {
        let out = parse_txt_from_strings(&["ip4:203.0.113.7"]);
        assert_eq!(out.ips, vec!["203.0.113.7"]);
        assert!(out.domains.is_empty());
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let out = parse_txt_from_strings(&[
            "include:mail.example.com ip4:192.0.2.1",
            "MAIL.example.com 192.0.2.1",
        ]);
        assert_eq!(out.domains, vec!["mail.example.com"]);
        assert_eq!(out.ips, vec!["192.0.2.1"]);
    }

    #[test]
    fn test_invalid_octets_are_dropped() {
        let out = parse_txt_from_strings(&["999.1.1.1 10.0.0.1"]);
        assert_eq!(out.ips, vec!["10.0.0.1"]);
    }

    #[test]
    fn test_verification_tokens_are_not_domains() {
        let out = parse_txt_from_strings(&["google-site-verification=abc123XYZ"]);
        assert!(out.domains.is_empty());
        assert!(out.ips.is_empty());
        assert_eq!(out.raw.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let out = parse_txt_from_strings::<&str>(&[]);
        assert!(out.is_empty());
    }
}
