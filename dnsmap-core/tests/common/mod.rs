// Scripted DnsLookup used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dnsmap_scanner::error::Result;
use dnsmap_scanner::{
    DnsLookup, LookupError, Neighbor, RecordKind, RecordMap, SrvEntry, SrvMap, SubdomainHit,
    TxtRecords,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Answers from fixed tables; anything not scripted is an empty result.
#[derive(Default)]
pub struct FakeLookup {
    records: HashMap<String, RecordMap>,
    txts: HashMap<String, TxtRecords>,
    subs: HashMap<String, Vec<SubdomainHit>>,
    parents: HashMap<String, Vec<String>>,
    srvs: HashMap<String, SrvMap>,
    ptrs: HashMap<String, Vec<String>>,
    neighbors: HashMap<String, Vec<Neighbor>>,
    failing: HashSet<(String, String)>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, name: &str, kind: RecordKind, values: &[&str]) -> Self {
        self.records
            .entry(name.to_string())
            .or_default()
            .insert(kind, strings(values));
        self
    }

    pub fn with_txt_domains(mut self, name: &str, domains: &[&str]) -> Self {
        let txt = self.txts.entry(name.to_string()).or_default();
        txt.raw.push(format!("v=spf1 include:{} -all", domains.join(" include:")));
        txt.domains.extend(strings(domains));
        self
    }

    pub fn with_txt_ips(mut self, name: &str, ips: &[&str]) -> Self {
        self.txts
            .entry(name.to_string())
            .or_default()
            .ips
            .extend(strings(ips));
        self
    }

    pub fn with_sub(mut self, name: &str, sub: &str, a: &[&str]) -> Self {
        let mut hit = SubdomainHit::new(sub);
        hit.a = strings(a);
        self.subs.entry(name.to_string()).or_default().push(hit);
        self
    }

    pub fn with_parents(mut self, name: &str, parents: &[&str]) -> Self {
        self.parents.insert(name.to_string(), strings(parents));
        self
    }

    pub fn with_srv(mut self, name: &str, service: &str, target: &str, port: u16) -> Self {
        self.srvs
            .entry(name.to_string())
            .or_default()
            .entry(service.to_string())
            .or_default()
            .push(SrvEntry {
                priority: 10,
                weight: 5,
                port,
                target: target.to_string(),
            });
        self
    }

    pub fn with_ptr(mut self, address: &str, names: &[&str]) -> Self {
        self.ptrs.insert(address.to_string(), strings(names));
        self
    }

    pub fn with_neighbor(mut self, address: &str, neighbor: &str, ptrs: &[&str]) -> Self {
        self.neighbors
            .entry(address.to_string())
            .or_default()
            .push(Neighbor {
                ip: neighbor.to_string(),
                ptrs: strings(ptrs),
            });
        self
    }

    /// Make `op` fail with an unexpected error for `subject`.
    pub fn failing(mut self, op: &str, subject: &str) -> Self {
        self.failing.insert((op.to_string(), subject.to_string()));
        self
    }

    /// Sleep this long inside every forward resolution.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call made so far as `(op, subject)`, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str, subject: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, s)| o == op && s == subject)
            .count()
    }

    pub fn subjects_of(&self, op: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| o == op)
            .map(|(_, s)| s.clone())
            .collect()
    }

    fn record(&self, op: &str, subject: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), subject.to_string()));
        if self.failing.contains(&(op.to_string(), subject.to_string())) {
            return Err(LookupError::Other(format!("scripted {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsLookup for FakeLookup {
    async fn resolve_records(&self, name: &str) -> Result<RecordMap> {
        self.record("records", name)?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut map: RecordMap = RecordKind::ALL.into_iter().map(|k| (k, Vec::new())).collect();
        if let Some(scripted) = self.records.get(name) {
            for (kind, values) in scripted {
                map.insert(*kind, values.clone());
            }
        }
        Ok(map)
    }

    async fn parse_txt(&self, name: &str) -> Result<TxtRecords> {
        self.record("txt", name)?;
        Ok(self.txts.get(name).cloned().unwrap_or_default())
    }

    async fn enumerate_subdomains(
        &self,
        name: &str,
        wordlist: Option<&[String]>,
    ) -> Result<Vec<SubdomainHit>> {
        self.record("sub", name)?;
        let hits = self.subs.get(name).cloned().unwrap_or_default();
        Ok(match wordlist {
            Some(words) => hits
                .into_iter()
                .filter(|hit| words.iter().any(|w| hit.sub == format!("{}.{}", w, name)))
                .collect(),
            None => hits,
        })
    }

    async fn crawl_to_tld(&self, name: &str) -> Result<Vec<String>> {
        self.record("crawl", name)?;
        Ok(self.parents.get(name).cloned().unwrap_or_default())
    }

    async fn scan_srv(&self, name: &str) -> Result<SrvMap> {
        self.record("srv", name)?;
        Ok(self.srvs.get(name).cloned().unwrap_or_default())
    }

    async fn reverse_lookup(&self, address: &str) -> Result<Vec<String>> {
        self.record("rev", address)?;
        Ok(self.ptrs.get(address).cloned().unwrap_or_default())
    }

    async fn ip_neighbors(&self, address: &str, radius: u32) -> Result<Vec<Neighbor>> {
        self.record("neighbors", address)?;
        Ok(self
            .neighbors
            .get(address)
            .map(|n| n.iter().take(radius as usize * 2).cloned().collect())
            .unwrap_or_default())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The `root.test` fixture: TXT chain root -> txt1 -> txt2 and one subdomain.
pub fn root_test_lookup() -> FakeLookup {
    FakeLookup::new()
        .with_txt_domains("root.test", &["txt1.root.test"])
        .with_txt_domains("txt1.root.test", &["txt2.root.test"])
        .with_sub("root.test", "sub1.root.test", &[])
}
