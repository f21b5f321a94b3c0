//! Persisted lookup form of the range table
//!
//! Parsing the full Range Message on every start is slow compared to
//! reading back an already built table. The cache is a plain serde dump of
//! [`RangeTable`], either JSON or MessagePack, and is validated again on
//! load so that a hand-edited file cannot smuggle in a length-0 rule.

use std::path::Path;

use super::RangeTable;
use crate::domain::RangeTableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFormat {
    Json,
    MessagePack,
}

impl CacheFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(CacheFormat::Json),
            "msgpack" | "mpk" => Some(CacheFormat::MessagePack),
            _ => None,
        }
    }
}

impl RangeTable {
    pub fn to_bytes(&self, format: CacheFormat) -> Result<Vec<u8>, RangeTableError> {
        match format {
            CacheFormat::Json => Ok(serde_json::to_vec(self)?),
            CacheFormat::MessagePack => Ok(rmp_serde::to_vec_named(self)?),
        }
    }

    pub fn from_bytes(bytes: &[u8], format: CacheFormat) -> Result<Self, RangeTableError> {
        let table: RangeTable = match format {
            CacheFormat::Json => serde_json::from_slice(bytes)?,
            CacheFormat::MessagePack => rmp_serde::from_slice(bytes)?,
        };
        table.validate()?;
        Ok(table)
    }

    /// Writes the table to `path` in the format named by its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RangeTableError> {
        let path = path.as_ref();
        let format = CacheFormat::from_path(path)
            .ok_or_else(|| RangeTableError::UnsupportedFormat(path.display().to_string()))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes(format)?)?;

        tracing::debug!("Range cache written to {}", path.display());
        Ok(())
    }

    pub fn load_cache(path: impl AsRef<Path>, format: CacheFormat) -> Result<Self, RangeTableError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, format)
    }
}
