use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("DNS resolver error: {0}")]
    ResolverError(#[from] hickory_resolver::error::ResolveError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;
