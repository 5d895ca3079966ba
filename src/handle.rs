// src/handle.rs
// Database capability interface and handle resolution.

use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{MongoFrameError, Result};

/// Outcome of one insert_many call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertResult {
    pub inserted_count: u64,
    /// `_id` values assigned to the inserted documents, in insert order
    pub inserted_ids: Vec<Value>,
}

/// Driver options forwarded verbatim to an aggregation call
/// (batchSize, allowDiskUse and the like). Opaque to this layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOptions {
    options: Map<String, Value>,
}

impl AggregateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.options.iter()
    }

    /// Overlay `other` on top of self; `other` wins on key collision.
    pub fn merged_with(mut self, other: &AggregateOptions) -> AggregateOptions {
        for (key, value) in other.iter() {
            self.options.insert(key.clone(), value.clone());
        }
        self
    }
}

/// The narrow capability surface this layer needs from a database.
///
/// Implemented by [`crate::memory::MemoryDatabase`] for embedded use
/// and tests; a driver-backed implementation adapts a real client to
/// the same four calls.
pub trait DatabaseHandle {
    /// Current number of documents in the collection (0 when absent)
    fn document_count(&self, collection: &str) -> Result<u64>;

    /// Drop the collection outright. Dropping an absent collection is a no-op.
    fn drop_collection(&self, collection: &str) -> Result<()>;

    /// Insert documents in order; creates the collection implicitly.
    fn insert_many(&self, collection: &str, documents: &[Document]) -> Result<InsertResult>;

    /// Run an aggregation pipeline, returning documents in result order.
    /// The pipeline stages are opaque stage descriptors.
    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Value],
        options: &AggregateOptions,
    ) -> Result<Vec<Document>>;
}

/// Opens a fresh connection from a connection string. The database
/// name extracted from the string's path component is passed along so
/// connectors need not re-parse.
pub trait Connector {
    fn connect(&self, uri: &str, database: &str) -> Result<Box<dyn DatabaseHandle>>;
}

/// Either a live handle or a connection string to resolve through a
/// [`Connector`].
pub enum DbRef<'a> {
    Handle(&'a dyn DatabaseHandle),
    Uri {
        uri: &'a str,
        connector: &'a dyn Connector,
    },
}

impl<'a> DbRef<'a> {
    pub fn handle(handle: &'a dyn DatabaseHandle) -> Self {
        DbRef::Handle(handle)
    }

    pub fn uri(uri: &'a str, connector: &'a dyn Connector) -> Self {
        DbRef::Uri { uri, connector }
    }
}

impl<'a, H: DatabaseHandle> From<&'a H> for DbRef<'a> {
    fn from(handle: &'a H) -> Self {
        DbRef::Handle(handle)
    }
}

/// A resolved handle, either borrowed from the caller or freshly
/// opened for this one call (never cached).
pub enum ResolvedDb<'a> {
    Borrowed(&'a dyn DatabaseHandle),
    Owned(Box<dyn DatabaseHandle>),
}

impl ResolvedDb<'_> {
    pub fn as_handle(&self) -> &dyn DatabaseHandle {
        match self {
            ResolvedDb::Borrowed(handle) => *handle,
            ResolvedDb::Owned(handle) => handle.as_ref(),
        }
    }
}

/// Turn a [`DbRef`] into a usable handle. A URI opens a new connection
/// on every call.
pub fn resolve(db: DbRef<'_>) -> Result<ResolvedDb<'_>> {
    match db {
        DbRef::Handle(handle) => Ok(ResolvedDb::Borrowed(handle)),
        DbRef::Uri { uri, connector } => {
            let database = database_name_from_uri(uri)?;
            tracing::debug!(uri, database, "opening connection from uri");
            Ok(ResolvedDb::Owned(connector.connect(uri, database)?))
        }
    }
}

/// Extract the database name from a connection string's path component
/// (`scheme://host[,host...]/name[?options]`).
pub fn database_name_from_uri(uri: &str) -> Result<&str> {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let name = match rest.split_once('/') {
        Some((_, path)) => path.split(['/', '?']).next().unwrap_or(""),
        None => "",
    };
    if name.is_empty() {
        return Err(MongoFrameError::MissingDatabaseName(uri.to_string()));
    }
    Ok(name)
}
