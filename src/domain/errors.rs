//! Range table error types
//!
//! Only loading the registration-group table can fail loudly. Untrusted ISBN
//! input never produces one of these: validation, conversion and
//! decomposition report bad input as an absent result.

use std::fmt;

#[derive(Debug)]
pub enum RangeTableError {
    /// Reading or writing a table file failed
    Io(std::io::Error),
    /// The Range Message XML could not be deserialized
    Xml(String),
    /// A cached lookup file could not be encoded or decoded
    Cache(String),
    /// A registration group prefix is not a usable digit string
    InvalidGroup(String),
    /// A rule inside a group carries an unusable range or length
    InvalidRule { group: String, reason: String },
    /// The file extension does not name a known table format
    UnsupportedFormat(String),
}

impl fmt::Display for RangeTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeTableError::Io(e) => write!(f, "I/O error: {}", e),
            RangeTableError::Xml(msg) => write!(f, "Range message XML error: {}", msg),
            RangeTableError::Cache(msg) => write!(f, "Range cache error: {}", msg),
            RangeTableError::InvalidGroup(prefix) => {
                write!(f, "Invalid registration group prefix: {:?}", prefix)
            }
            RangeTableError::InvalidRule { group, reason } => {
                write!(f, "Invalid rule in group {}: {}", group, reason)
            }
            RangeTableError::UnsupportedFormat(path) => {
                write!(f, "Unsupported range table format: {}", path)
            }
        }
    }
}

impl std::error::Error for RangeTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RangeTableError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RangeTableError {
    fn from(e: std::io::Error) -> Self {
        RangeTableError::Io(e)
    }
}

impl From<serde_json::Error> for RangeTableError {
    fn from(e: serde_json::Error) -> Self {
        RangeTableError::Cache(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for RangeTableError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        RangeTableError::Cache(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for RangeTableError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        RangeTableError::Cache(e.to_string())
    }
}
