// src/lib.rs
// Transfer layer between tabular frames and document collections.
//
// Two public operations: `read_frame` materializes an aggregation
// result into a Frame, `write_frame` inserts a Frame's rows as
// documents. The database sits behind the narrow DatabaseHandle
// capability; `MemoryDatabase` is the embedded implementation.

pub mod chunk;
pub mod disposition;
pub mod document;
pub mod error;
pub mod frame;
pub mod handle;
pub mod memory;
pub mod read;
pub mod write;

// Public exports
pub use chunk::{chunks, validate_chunk_size};
pub use disposition::IfExists;
pub use document::Document;
pub use error::{MongoFrameError, Result};
pub use frame::{Column, Frame, Index, IndexSpec};
pub use handle::{
    database_name_from_uri, resolve, AggregateOptions, Connector, DatabaseHandle, DbRef,
    InsertResult, ResolvedDb,
};
pub use memory::MemoryDatabase;
pub use read::{read_frame, ReadOptions};
pub use write::{frame_to_documents, write_frame, WriteOptions, WriteOutcome};
