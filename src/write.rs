// src/write.rs
// Write pipeline: Frame rows -> documents -> insert_many.

use crate::chunk::{chunks, validate_chunk_size};
use crate::disposition::IfExists;
use crate::document::Document;
use crate::error::Result;
use crate::frame::{Frame, Index};
use crate::handle::{resolve, DbRef, InsertResult};

/// Options for [`write_frame`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOptions {
    if_exists: IfExists,
    index_label: Option<String>,
    chunk_size: Option<usize>,
    skip_index: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_if_exists(mut self, if_exists: IfExists) -> Self {
        self.if_exists = if_exists;
        self
    }

    /// Whether to write the frame's index as a document field (on by default)
    pub fn with_index(mut self, index: bool) -> Self {
        self.skip_index = !index;
        self
    }

    /// Explicit label for the index field. Matching the historical
    /// behavior this layer preserves, supplying a label suppresses
    /// index injection entirely; see `frame_to_documents`.
    pub fn with_index_label(mut self, label: impl Into<String>) -> Self {
        self.index_label = Some(label.into());
        self
    }

    /// Number of rows per insert_many call; unset writes all rows at once
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    fn include_index(&self) -> bool {
        !self.skip_index
    }
}

/// Result of a write: one insert result, or one per chunk in chunk order
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Single(InsertResult),
    Chunked(Vec<InsertResult>),
}

impl WriteOutcome {
    /// Total documents inserted across all insert calls
    pub fn inserted_count(&self) -> u64 {
        match self {
            WriteOutcome::Single(result) => result.inserted_count,
            WriteOutcome::Chunked(results) => results.iter().map(|r| r.inserted_count).sum(),
        }
    }
}

/// Convert frame rows to documents, one per row, one field per column
/// in column order.
///
/// The index becomes an extra field only when all three hold: `index`
/// is requested, no explicit `index_label` was supplied, and the
/// frame's index is a single-level named index. An unnamed index, an
/// explicit label, or a composite index all mean no injection. The
/// rule is deliberately kept in this one place.
pub fn frame_to_documents(frame: &Frame, index: bool, index_label: Option<&str>) -> Vec<Document> {
    let injected = match frame.index() {
        Index::Labels {
            name: Some(name),
            values,
        } if index && index_label.is_none() => Some((name, values)),
        _ => None,
    };

    let mut documents = Vec::with_capacity(frame.len());
    for row in 0..frame.len() {
        let mut doc = Document::new();
        for column in frame.columns() {
            doc.insert(column.name.clone(), column.values[row].clone());
        }
        if let Some((name, values)) = injected {
            doc.insert(name.clone(), values[row].clone());
        }
        documents.push(doc);
    }
    documents
}

/// Write a frame's rows as documents into `collection`.
///
/// Applies the if-exists policy first (which may abort the write),
/// then inserts either all documents at once or one chunk at a time.
/// Chunk inserts are sequential and in order; a failing chunk
/// propagates immediately and later chunks are never issued. Earlier
/// chunks stay committed.
pub fn write_frame(
    frame: &Frame,
    collection: &str,
    db: DbRef<'_>,
    options: &WriteOptions,
) -> Result<WriteOutcome> {
    if let Some(size) = options.chunk_size {
        validate_chunk_size(size)?;
    }

    let resolved = resolve(db)?;
    let handle = resolved.as_handle();

    options.if_exists.apply(handle, collection)?;

    let documents = frame_to_documents(frame, options.include_index(), options.index_label.as_deref());
    tracing::debug!(
        collection,
        rows = documents.len(),
        if_exists = options.if_exists.as_str(),
        "writing frame"
    );

    match options.chunk_size {
        Some(size) => {
            let mut results = Vec::new();
            for chunk in chunks(&documents, size)? {
                results.push(handle.insert_many(collection, chunk)?);
            }
            Ok(WriteOutcome::Chunked(results))
        }
        None => Ok(WriteOutcome::Single(handle.insert_many(collection, &documents)?)),
    }
}
