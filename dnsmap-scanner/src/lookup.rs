use crate::error::Result;
use crate::result::{Neighbor, RecordMap, SrvMap, SubdomainHit, TxtRecords};
use async_trait::async_trait;

/// The lookup strategies available to the expansion engine.
///
/// Ordinary lookup failures (no answer, NXDOMAIN, no nameservers, timeouts)
/// are absorbed by the implementation and surface as empty results. An `Err`
/// means something unexpected happened; callers treat it as an empty result
/// for that one call.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// A, AAAA, NS, MX, CNAME and SOA for `name`. Every type is present in the
    /// map; a type that could not be resolved maps to an empty list.
    async fn resolve_records(&self, name: &str) -> Result<RecordMap>;

    /// TXT strings of `name` and the domains/IPv4 addresses embedded in them.
    async fn parse_txt(&self, name: &str) -> Result<TxtRecords>;

    /// Brute-force `word.name` for each word; `None` uses the default list.
    async fn enumerate_subdomains(
        &self,
        name: &str,
        wordlist: Option<&[String]>,
    ) -> Result<Vec<SubdomainHit>>;

    /// Parent domains of `name`, nearest first, ending with the public suffix.
    async fn crawl_to_tld(&self, name: &str) -> Result<Vec<String>>;

    /// SRV answers for each well-known service under `name`.
    async fn scan_srv(&self, name: &str) -> Result<SrvMap>;

    /// PTR names for `address`.
    async fn reverse_lookup(&self, address: &str) -> Result<Vec<String>>;

    /// PTR names for the `radius` IPv4 addresses on each side of `address`.
    async fn ip_neighbors(&self, address: &str, radius: u32) -> Result<Vec<Neighbor>>;
}
