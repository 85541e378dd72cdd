use crate::config::ScannerConfig;
use crate::error::Result;
use crate::lookup::DnsLookup;
use crate::neighbors::neighbor_addresses;
use crate::parents::SuffixExtractor;
use crate::result::{Neighbor, RecordKind, RecordMap, SrvEntry, SrvMap, SubdomainHit, TxtRecords};
use crate::txt::parse_txt_from_strings;
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::system_conf::read_system_conf;
use std::net::IpAddr;
use tracing::{debug, warn};

/// Lookup strategies backed by a hickory resolver.
pub struct Scanner {
    resolver: TokioAsyncResolver,
    suffixes: SuffixExtractor,
    config: ScannerConfig,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    /// Build a scanner on the system resolver configuration, falling back to
    /// the resolver's default upstreams when it cannot be read.
    pub fn with_config(config: ScannerConfig) -> Self {
        let (resolver_config, opts) = read_system_conf().unwrap_or_else(|e| {
            warn!("Could not read system resolver configuration ({}), using defaults", e);
            (ResolverConfig::default(), ResolverOpts::default())
        });
        Self::from_parts(resolver_config, opts, config)
    }

    /// Build a scanner that queries the given upstreams only.
    pub fn with_resolver(resolver_config: ResolverConfig, config: ScannerConfig) -> Self {
        Self::from_parts(resolver_config, ResolverOpts::default(), config)
    }

    fn from_parts(
        resolver_config: ResolverConfig,
        mut opts: ResolverOpts,
        config: ScannerConfig,
    ) -> Self {
        opts.timeout = config.timeout;
        opts.attempts = config.attempts;

        Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
            suffixes: SuffixExtractor::new(),
            config,
        }
    }

    /// Query one record type, keeping only answers of that type (CNAME chain
    /// records are dropped). No answer, NXDOMAIN, no nameservers and
    /// timeouts all yield an empty list.
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<RData>> {
        let fqdn = absolute(name);
        let lookup = tokio::time::timeout(
            self.config.deadline,
            self.resolver.lookup(fqdn.as_str(), record_type),
        )
        .await;

        match lookup {
            Err(_) => {
                debug!("{} {} exceeded the {:?} deadline", name, record_type, self.config.deadline);
                Ok(Vec::new())
            }
            Ok(Ok(answer)) => Ok(answer
                .iter()
                .filter(|rdata| rdata.record_type() == record_type)
                .cloned()
                .collect()),
            Ok(Err(e)) if is_lookup_failure(&e) => {
                debug!("{} {}: {}", name, record_type, e);
                Ok(Vec::new())
            }
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Like `query`, but rendered to presentation text and never failing.
    async fn query_text(&self, name: &str, record_type: RecordType) -> Vec<String> {
        match self.query(name, record_type).await {
            Ok(answers) => answers.iter().map(|rdata| rdata.to_string()).collect(),
            Err(e) => {
                warn!("{} lookup for {} failed: {}", record_type, name, e);
                Vec::new()
            }
        }
    }

    async fn ptr_names(&self, ip: IpAddr) -> Vec<String> {
        let lookup =
            tokio::time::timeout(self.config.deadline, self.resolver.reverse_lookup(ip)).await;

        match lookup {
            Ok(Ok(answer)) => answer.iter().map(|ptr| relative(&ptr.to_string())).collect(),
            Ok(Err(e)) => {
                debug!("PTR {}: {}", ip, e);
                Vec::new()
            }
            Err(_) => {
                debug!("PTR {} exceeded the {:?} deadline", ip, self.config.deadline);
                Vec::new()
            }
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsLookup for Scanner {
    async fn resolve_records(&self, name: &str) -> Result<RecordMap> {
        let mut records = RecordMap::new();
        for kind in RecordKind::ALL {
            let values = self.query_text(name, record_type_of(kind)).await;
            records.insert(kind, values);
        }
        Ok(records)
    }

    async fn parse_txt(&self, name: &str) -> Result<TxtRecords> {
        let answers = self.query(name, RecordType::TXT).await?;
        let strings: Vec<String> = answers
            .iter()
            .filter_map(|rdata| match rdata {
                // multi-string records are one logical value
                RData::TXT(txt) => Some(
                    txt.iter()
                        .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                        .collect::<Vec<String>>()
                        .join(""),
                ),
                _ => None,
            })
            .collect();

        Ok(parse_txt_from_strings(&strings))
    }

    async fn enumerate_subdomains(
        &self,
        name: &str,
        wordlist: Option<&[String]>,
    ) -> Result<Vec<SubdomainHit>> {
        let words = wordlist.unwrap_or(self.config.wordlist.as_slice());
        let mut found = Vec::new();

        for word in words {
            let mut hit = SubdomainHit::new(format!("{}.{}", word, name));
            hit.a = self.query_text(&hit.sub, RecordType::A).await;
            hit.aaaa = self.query_text(&hit.sub, RecordType::AAAA).await;
            hit.cname = self
                .query_text(&hit.sub, RecordType::CNAME)
                .await
                .iter()
                .map(|c| relative(c))
                .collect();

            if hit.has_records() {
                debug!("Subdomain hit: {}", hit.sub);
                found.push(hit);
            }
        }

        Ok(found)
    }

    async fn crawl_to_tld(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.suffixes.parents(name))
    }

    async fn scan_srv(&self, name: &str) -> Result<SrvMap> {
        let mut out = SrvMap::new();

        for service in &self.config.services {
            let qname = format!("{}.{}", service, name);
            let entries = match self.query(&qname, RecordType::SRV).await {
                Ok(answers) => answers
                    .iter()
                    .filter_map(|rdata| match rdata {
                        RData::SRV(srv) => Some(SrvEntry {
                            priority: srv.priority(),
                            weight: srv.weight(),
                            port: srv.port(),
                            target: relative(&srv.target().to_string()),
                        }),
                        _ => None,
                    })
                    .collect(),
                Err(e) => {
                    warn!("SRV lookup for {} failed: {}", qname, e);
                    Vec::new()
                }
            };
            out.insert(service.clone(), entries);
        }

        Ok(out)
    }

    async fn reverse_lookup(&self, address: &str) -> Result<Vec<String>> {
        match address.parse::<IpAddr>() {
            Ok(ip) => Ok(self.ptr_names(ip).await),
            Err(_) => {
                debug!("Not an address, skipping PTR lookup: {}", address);
                Ok(Vec::new())
            }
        }
    }

    async fn ip_neighbors(&self, address: &str, radius: u32) -> Result<Vec<Neighbor>> {
        let ip = match address.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => ip,
            Ok(IpAddr::V6(_)) | Err(_) => {
                debug!("Neighbor probing needs an IPv4 address, got {}", address);
                return Ok(Vec::new());
            }
        };

        let mut out = Vec::new();
        for neighbor in neighbor_addresses(ip, radius) {
            let ptrs = self.ptr_names(IpAddr::V4(neighbor)).await;
            out.push(Neighbor {
                ip: neighbor.to_string(),
                ptrs,
            });
        }

        Ok(out)
    }
}

fn record_type_of(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Aaaa => RecordType::AAAA,
        RecordKind::Ns => RecordType::NS,
        RecordKind::Mx => RecordType::MX,
        RecordKind::Cname => RecordType::CNAME,
        RecordKind::Soa => RecordType::SOA,
    }
}

fn is_lookup_failure(error: &ResolveError) -> bool {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { .. }
        | ResolveErrorKind::NoConnections
        | ResolveErrorKind::Timeout => true,
        ResolveErrorKind::Proto(proto) => matches!(proto.kind(), ProtoErrorKind::Timeout),
        _ => false,
    }
}

/// Queries go out fully qualified so resolver search domains never apply.
fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

fn relative(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}
