// src/chunk.rs
// Batched processing helper: split a sequence into contiguous chunks.

use crate::error::{MongoFrameError, Result};

/// Check a chunk size before use. Exposed separately because the read
/// pipeline validates a chunk size it never splits with (it becomes a
/// batchSize hint instead).
pub fn validate_chunk_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(MongoFrameError::InvalidChunkSize(size));
    }
    Ok(())
}

/// Split `items` into contiguous in-order slices of length <= `size`.
///
/// Every call returns a fresh iterator over the same slice, so callers
/// can re-iterate without sharing a cursor. Concatenating the chunks
/// reproduces `items` exactly; an empty input yields zero chunks.
pub fn chunks<T>(items: &[T], size: usize) -> Result<std::slice::Chunks<'_, T>> {
    validate_chunk_size(size)?;
    Ok(items.chunks(size))
}
