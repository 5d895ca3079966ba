// src/read.rs
// Read pipeline: aggregation result -> Frame.

use serde_json::{json, Value};

use crate::chunk::validate_chunk_size;
use crate::error::{MongoFrameError, Result};
use crate::frame::{Frame, IndexSpec};
use crate::handle::{resolve, AggregateOptions, DbRef};

const BATCH_SIZE_KEY: &str = "batchSize";

/// Options for [`read_frame`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    index_col: Option<IndexSpec>,
    extra: AggregateOptions,
    chunk_size: Option<usize>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field(s) of the result documents to use as the frame index
    pub fn with_index_col(mut self, spec: impl Into<IndexSpec>) -> Self {
        self.index_col = Some(spec.into());
        self
    }

    /// Extra driver parameters forwarded to the aggregation call.
    /// On key collision these win over parameters this layer derives.
    pub fn with_extra(mut self, extra: AggregateOptions) -> Self {
        self.extra = extra;
        self
    }

    /// Result batch size hint; becomes a batchSize parameter.
    /// Mutually exclusive with an explicit batchSize in the extras.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
}

/// Run an aggregation pipeline against `collection` and materialize
/// the result into a [`Frame`].
///
/// The pipeline is passed through verbatim. Column order is first-seen
/// field order across the result documents and row order is the
/// result order, never re-sorted.
pub fn read_frame(
    collection: &str,
    pipeline: &[Value],
    db: DbRef<'_>,
    options: &ReadOptions,
) -> Result<Frame> {
    let mut params = AggregateOptions::new();
    if let Some(size) = options.chunk_size {
        validate_chunk_size(size)?;
        if options.extra.contains(BATCH_SIZE_KEY) {
            return Err(MongoFrameError::ConflictingBatchSize);
        }
        params = params.with(BATCH_SIZE_KEY, json!(size));
    }
    let params = params.merged_with(&options.extra);

    let resolved = resolve(db)?;
    tracing::debug!(collection, stages = pipeline.len(), "running aggregation");
    let documents = resolved
        .as_handle()
        .aggregate(collection, pipeline, &params)?;
    tracing::trace!(collection, documents = documents.len(), "materializing frame");

    Frame::from_documents(documents, options.index_col.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ReadOptions::new()
            .with_index_col("t")
            .with_chunk_size(5)
            .with_extra(AggregateOptions::new().with("allowDiskUse", json!(true)));

        assert_eq!(options.index_col, Some(IndexSpec::Single("t".to_string())));
        assert_eq!(options.chunk_size, Some(5));
        assert!(options.extra.contains("allowDiskUse"));
    }
}
