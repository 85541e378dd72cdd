use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A discovery technique the engine can run for each frontier item.
///
/// Declaration order is the order strategies run in for every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Txt,
    Sub,
    Crawl,
    Srv,
    Neighbors,
    Rev,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Txt,
        Strategy::Sub,
        Strategy::Crawl,
        Strategy::Srv,
        Strategy::Neighbors,
        Strategy::Rev,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Txt => "txt",
            Strategy::Sub => "sub",
            Strategy::Crawl => "crawl",
            Strategy::Srv => "srv",
            Strategy::Neighbors => "neighbors",
            Strategy::Rev => "rev",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Strategy::Txt),
            "sub" => Ok(Strategy::Sub),
            "crawl" => Ok(Strategy::Crawl),
            "srv" => Ok(Strategy::Srv),
            "neighbors" => Ok(Strategy::Neighbors),
            "rev" => Ok(Strategy::Rev),
            other => Err(format!("Unknown strategy '{}'", other)),
        }
    }
}

/// The set of enabled strategies. Forward-record resolution is not a member:
/// it always runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySet(BTreeSet<Strategy>);

impl StrategySet {
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        Strategy::ALL.into_iter().collect()
    }

    pub fn with(mut self, strategy: Strategy) -> Self {
        self.0.insert(strategy);
        self
    }

    pub fn contains(&self, strategy: Strategy) -> bool {
        self.0.contains(&strategy)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Enabled strategies in execution order.
    pub fn iter(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Strategy> for StrategySet {
    fn from_iter<I: IntoIterator<Item = Strategy>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for StrategySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|s| s.as_str()).collect();
        f.write_str(&names.join(","))
    }
}
