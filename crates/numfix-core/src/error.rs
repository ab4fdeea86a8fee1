use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid country key: {0:?}")]
    InvalidCountryKey(String),
    #[error("invalid dialing prefix: {0:?}")]
    InvalidDialingPrefix(String),
    #[error("invalid required length {length} for dialing prefix {prefix}")]
    InvalidRequiredLength { prefix: String, length: usize },
}
