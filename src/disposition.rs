// src/disposition.rs
// Pre-write policy for a collection that may already hold documents.

use std::fmt;
use std::str::FromStr;

use crate::error::{MongoFrameError, Result};
use crate::handle::DatabaseHandle;

/// What to do when the target collection already holds documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IfExists {
    /// Abort the write when the collection is non-empty
    #[default]
    Fail,
    /// Drop a non-empty collection first; inserts recreate it implicitly
    Replace,
    /// Insert without any existence check
    Append,
}

impl IfExists {
    pub fn as_str(&self) -> &'static str {
        match self {
            IfExists::Fail => "fail",
            IfExists::Replace => "replace",
            IfExists::Append => "append",
        }
    }

    /// Apply the policy against the target collection. The count query
    /// is the one piece of validation that has to touch the database.
    pub fn apply(&self, db: &dyn DatabaseHandle, collection: &str) -> Result<()> {
        match self {
            IfExists::Append => Ok(()),
            IfExists::Fail => {
                if db.document_count(collection)? > 0 {
                    return Err(MongoFrameError::CollectionExists(collection.to_string()));
                }
                Ok(())
            }
            IfExists::Replace => {
                if db.document_count(collection)? > 0 {
                    tracing::debug!(collection, "dropping non-empty collection before write");
                    db.drop_collection(collection)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for IfExists {
    type Err = MongoFrameError;

    /// Parse a disposition string; anything outside the enumerated set
    /// fails before any database I/O.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail" => Ok(IfExists::Fail),
            "replace" => Ok(IfExists::Replace),
            "append" => Ok(IfExists::Append),
            other => Err(MongoFrameError::InvalidDisposition(other.to_string())),
        }
    }
}

impl fmt::Display for IfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
