// src/frame.rs
// Tabular frame: ordered equal-length columns plus a row index.

use serde_json::Value;

use crate::document::Document;
use crate::error::{MongoFrameError, Result};

/// One named column of scalar values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Row index of a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    /// Default positional index (0, 1, 2, ...), unnamed
    Range,
    /// Single-level index, optionally named
    Labels {
        name: Option<String>,
        values: Vec<Value>,
    },
    /// Multi-level index: one tuple of values per row
    Composite {
        names: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

impl Index {
    fn len(&self) -> Option<usize> {
        match self {
            Index::Range => None,
            Index::Labels { values, .. } => Some(values.len()),
            Index::Composite { rows, .. } => Some(rows.len()),
        }
    }
}

/// Which result fields the read pipeline should turn into the index
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSpec {
    Single(String),
    Multi(Vec<String>),
}

impl From<&str> for IndexSpec {
    fn from(field: &str) -> Self {
        IndexSpec::Single(field.to_string())
    }
}

impl From<Vec<&str>> for IndexSpec {
    fn from(fields: Vec<&str>) -> Self {
        IndexSpec::Multi(fields.iter().map(|f| f.to_string()).collect())
    }
}

/// In-memory tabular frame.
///
/// The transfer layer only ever iterates a frame it is given; mutation
/// stays with the owning caller through the builder methods here.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    index: Index,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

impl Frame {
    /// New empty frame with the default positional index
    pub fn new() -> Self {
        Frame {
            columns: Vec::new(),
            index: Index::Range,
        }
    }

    /// Append a column. All columns must hold the same number of values.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        let expected = self.known_len();
        if let Some(expected) = expected {
            if values.len() != expected {
                return Err(MongoFrameError::ColumnLength {
                    column: name,
                    expected,
                    actual: values.len(),
                });
            }
        }
        self.columns.push(Column { name, values });
        Ok(self)
    }

    /// Move a column into the index, like a pandas-style `set_index`.
    /// The column leaves the column set and its name becomes the index name.
    pub fn set_index(mut self, column: &str) -> Result<Self> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| MongoFrameError::UnknownColumn(column.to_string()))?;
        let col = self.columns.remove(pos);
        self.index = Index::Labels {
            name: Some(col.name),
            values: col.values,
        };
        Ok(self)
    }

    /// Replace the index with unnamed labels
    pub fn with_index_values(mut self, values: Vec<Value>) -> Result<Self> {
        if let Some(expected) = self.columns.first().map(|c| c.values.len()) {
            if values.len() != expected {
                return Err(MongoFrameError::ColumnLength {
                    column: "<index>".to_string(),
                    expected,
                    actual: values.len(),
                });
            }
        }
        self.index = Index::Labels { name: None, values };
        Ok(self)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.known_len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    // Row count from columns, or from the index when no columns remain
    // (a read that turns every field into the index).
    fn known_len(&self) -> Option<usize> {
        self.columns
            .first()
            .map(|c| c.values.len())
            .or_else(|| self.index.len())
    }

    /// Materialize an aggregation result into a frame.
    ///
    /// Column order is first-seen field order across the documents; a
    /// field a document omits reads as Null, and a field first seen in
    /// a later document is back-filled with Null for earlier rows. Row
    /// order is document order. `index_col` moves the named field(s)
    /// out of the columns and into the index.
    pub fn from_documents(documents: Vec<Document>, index_col: Option<&IndexSpec>) -> Result<Self> {
        let row_count = documents.len();
        let mut columns: Vec<Column> = Vec::new();

        for (row, doc) in documents.iter().enumerate() {
            for (field, value) in doc.iter() {
                let pos = match columns.iter().position(|c| &c.name == field) {
                    Some(pos) => pos,
                    None => {
                        // back-fill rows that predate this field
                        columns.push(Column {
                            name: field.clone(),
                            values: vec![Value::Null; row],
                        });
                        columns.len() - 1
                    }
                };
                columns[pos].values.push(value.clone());
            }
            for col in &mut columns {
                if col.values.len() == row {
                    col.values.push(Value::Null);
                }
            }
        }

        let mut frame = Frame {
            columns,
            index: Index::Range,
        };

        match index_col {
            None => {}
            Some(IndexSpec::Single(field)) => {
                frame = frame.set_index(field)?;
            }
            Some(IndexSpec::Multi(fields)) => {
                let mut names = Vec::with_capacity(fields.len());
                let mut per_field = Vec::with_capacity(fields.len());
                for field in fields {
                    let pos = frame
                        .columns
                        .iter()
                        .position(|c| &c.name == field)
                        .ok_or_else(|| MongoFrameError::UnknownColumn(field.clone()))?;
                    let col = frame.columns.remove(pos);
                    names.push(col.name);
                    per_field.push(col.values);
                }
                let rows = (0..row_count)
                    .map(|row| per_field.iter().map(|values| values[row].clone()).collect())
                    .collect();
                frame.index = Index::Composite { names, rows };
            }
        }

        Ok(frame)
    }
}
