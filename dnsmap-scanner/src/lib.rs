pub mod config;
pub mod error;
pub mod lookup;
pub mod neighbors;
pub mod parents;
pub mod result;
pub mod scanner;
pub mod txt;

pub use config::{DEFAULT_SERVICES, ScannerConfig, default_wordlist, load_wordlist};
pub use error::LookupError;
pub use lookup::DnsLookup;
pub use neighbors::MAX_NEIGHBOR_RADIUS;
pub use result::{
    Neighbor, RecordKind, RecordMap, SrvEntry, SrvMap, SubdomainHit, TxtRecords, empty_records,
};
pub use scanner::Scanner;
