use crate::error::Result;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_WORDLIST: &str = include_str!("../wordlists/subdomains.txt");

/// Well-known services probed by the SRV scan.
pub const DEFAULT_SERVICES: &[&str] = &[
    "_sip._tcp",
    "_sip._udp",
    "_sip._tls",
    "_xmpp-server._tcp",
    "_xmpp-client._tcp",
    "_ldap._tcp",
    "_kerberos._udp",
    "_http._tcp",
    "_smtp._tcp",
    "_imap._tcp",
    "_pop3._tcp",
];

/// Resolver tuning and the candidate lists handed to the scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Per-attempt timeout given to the resolver.
    pub timeout: Duration,
    /// Resolver attempts per query.
    pub attempts: usize,
    /// Overall deadline for a single query, attempts included.
    pub deadline: Duration,
    pub wordlist: Vec<String>,
    pub services: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            attempts: 1,
            deadline: Duration::from_secs(4),
            wordlist: default_wordlist(),
            services: DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScannerConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.deadline = timeout * 2;
        self
    }
}

/// The bundled subdomain wordlist.
pub fn default_wordlist() -> Vec<String> {
    parse_wordlist(DEFAULT_WORDLIST)
}

/// Load a wordlist, one word per line. `~` is expanded; blank lines are skipped.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::tilde(raw.as_ref());
    let content = fs::read_to_string(expanded.as_ref())?;
    Ok(parse_wordlist(&content))
}

fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
