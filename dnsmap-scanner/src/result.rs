use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Forward record types queried for every name, in query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    A,
    Aaaa,
    Ns,
    Mx,
    Cname,
    Soa,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::A,
        RecordKind::Aaaa,
        RecordKind::Ns,
        RecordKind::Mx,
        RecordKind::Cname,
        RecordKind::Soa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Ns => "NS",
            RecordKind::Mx => "MX",
            RecordKind::Cname => "CNAME",
            RecordKind::Soa => "SOA",
        }
    }

    /// Whether values of this type are address literals.
    pub fn is_address(&self) -> bool {
        matches!(self, RecordKind::A | RecordKind::Aaaa)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record type -> presentation-format values, ordered by `RecordKind`.
pub type RecordMap = BTreeMap<RecordKind, Vec<String>>;

/// A map with every queried type present and no values.
pub fn empty_records() -> RecordMap {
    RecordKind::ALL.into_iter().map(|kind| (kind, Vec::new())).collect()
}

/// TXT strings of a name plus the indicators found inside them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecords {
    pub raw: Vec<String>,
    pub domains: Vec<String>,
    pub ips: Vec<String>,
}

impl TxtRecords {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.domains.is_empty() && self.ips.is_empty()
    }
}

/// A brute-forced subdomain that answered with at least one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainHit {
    pub sub: String,
    #[serde(rename = "A")]
    pub a: Vec<String>,
    #[serde(rename = "AAAA")]
    pub aaaa: Vec<String>,
    #[serde(rename = "CNAME")]
    pub cname: Vec<String>,
}

impl SubdomainHit {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            ..Default::default()
        }
    }

    pub fn has_records(&self) -> bool {
        !(self.a.is_empty() && self.aaaa.is_empty() && self.cname.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvEntry {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Service key (e.g. `_sip._tcp`) -> SRV answers. Every probed service is present.
pub type SrvMap = BTreeMap<String, Vec<SrvEntry>>;

/// An adjacent IPv4 address and its PTR names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub ip: String,
    pub ptrs: Vec<String>,
}
