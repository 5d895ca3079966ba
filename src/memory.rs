// src/memory.rs
// Embedded in-memory backend implementing the DatabaseHandle capability.

use std::cmp::Ordering;
use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::{json, Map, Value};

use crate::document::Document;
use crate::error::{MongoFrameError, Result};
use crate::handle::{AggregateOptions, DatabaseHandle, InsertResult};

#[derive(Default)]
struct StoredCollection {
    documents: Vec<Document>,
    last_id: u64,
}

/// In-memory document store.
///
/// Collections are created implicitly on first insert and read as
/// empty while absent. Documents without an `_id` get an
/// auto-increment integer id on insert. The aggregation entry point
/// interprets a small stage subset ($match, $project, $sort, $skip,
/// $limit); anything else is rejected as unsupported. Driver options
/// such as batchSize are accepted and ignored (they are hints for a
/// wire client, not semantics).
#[derive(Default)]
pub struct MemoryDatabase {
    collections: RwLock<HashMap<String, StoredCollection>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of collections holding at least one document ever inserted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of a collection's documents in insert order
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }
}

impl DatabaseHandle for MemoryDatabase {
    fn document_count(&self, collection: &str) -> Result<u64> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map_or(0, |c| c.documents.len() as u64))
    }

    fn drop_collection(&self, collection: &str) -> Result<()> {
        self.collections.write().remove(collection);
        Ok(())
    }

    fn insert_many(&self, collection: &str, documents: &[Document]) -> Result<InsertResult> {
        let mut collections = self.collections.write();
        let stored = collections.entry(collection.to_string()).or_default();

        let mut result = InsertResult::default();
        for doc in documents {
            let mut doc = doc.clone();
            if !doc.contains("_id") {
                stored.last_id += 1;
                doc.insert("_id".to_string(), json!(stored.last_id));
            }
            result
                .inserted_ids
                .push(doc.get("_id").cloned().unwrap_or(Value::Null));
            result.inserted_count += 1;
            stored.documents.push(doc);
        }
        Ok(result)
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Value],
        _options: &AggregateOptions,
    ) -> Result<Vec<Document>> {
        let mut docs = self.documents(collection);

        for stage in pipeline {
            let obj = stage
                .as_object()
                .ok_or_else(|| MongoFrameError::InvalidQuery("stage must be an object".into()))?;
            let (op, body) = obj.iter().next().ok_or_else(|| {
                MongoFrameError::InvalidQuery("stage must hold exactly one operator".into())
            })?;
            if obj.len() != 1 {
                return Err(MongoFrameError::InvalidQuery(
                    "stage must hold exactly one operator".into(),
                ));
            }

            match op.as_str() {
                "$match" => {
                    let cond = body.as_object().ok_or_else(|| {
                        MongoFrameError::InvalidQuery("$match requires an object".into())
                    })?;
                    let mut kept = Vec::with_capacity(docs.len());
                    for doc in docs {
                        if matches_condition(&doc, cond)? {
                            kept.push(doc);
                        }
                    }
                    docs = kept;
                }
                "$project" => {
                    let spec = body.as_object().ok_or_else(|| {
                        MongoFrameError::InvalidQuery("$project requires an object".into())
                    })?;
                    docs = docs
                        .into_iter()
                        .map(|doc| apply_projection(&doc, spec))
                        .collect::<Result<_>>()?;
                }
                "$sort" => {
                    let spec = body.as_object().ok_or_else(|| {
                        MongoFrameError::InvalidQuery("$sort requires an object".into())
                    })?;
                    sort_documents(&mut docs, spec)?;
                }
                "$skip" => {
                    let count = stage_count(body, "$skip")?;
                    docs = if count >= docs.len() {
                        Vec::new()
                    } else {
                        docs.split_off(count)
                    };
                }
                "$limit" => {
                    let count = stage_count(body, "$limit")?;
                    docs.truncate(count);
                }
                other => return Err(MongoFrameError::UnsupportedStage(other.to_string())),
            }
        }

        Ok(docs)
    }
}

fn stage_count(body: &Value, stage: &str) -> Result<usize> {
    body.as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| MongoFrameError::InvalidQuery(format!("{stage} requires a non-negative integer")))
}

/// All field conditions of a $match object must hold.
fn matches_condition(doc: &Document, cond: &Map<String, Value>) -> Result<bool> {
    for (field, expected) in cond {
        if field.starts_with('$') {
            return Err(MongoFrameError::InvalidQuery(format!(
                "unsupported top-level operator: {field}"
            )));
        }
        if !field_matches(doc.get(field), expected)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> Result<bool> {
    let ops = match expected {
        Value::Object(ops) => ops,
        // bare value is shorthand for $eq
        literal => return Ok(actual == Some(literal)),
    };

    for (op, operand) in ops {
        let holds = match op.as_str() {
            "$eq" => actual == Some(operand),
            "$ne" => actual != Some(operand),
            "$gt" => compare_for_query(actual, operand) == Some(Ordering::Greater),
            "$gte" => matches!(
                compare_for_query(actual, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "$lt" => compare_for_query(actual, operand) == Some(Ordering::Less),
            "$lte" => matches!(
                compare_for_query(actual, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            "$in" => operand
                .as_array()
                .ok_or_else(|| MongoFrameError::InvalidQuery("$in requires array".into()))?
                .iter()
                .any(|v| actual == Some(v)),
            "$nin" => !operand
                .as_array()
                .ok_or_else(|| MongoFrameError::InvalidQuery("$nin requires array".into()))?
                .iter()
                .any(|v| actual == Some(v)),
            other => {
                return Err(MongoFrameError::InvalidQuery(format!(
                    "unknown operator: {other}"
                )))
            }
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Ordering comparison for range operators. Only values of the same
/// kind compare; a missing field or a type mismatch never satisfies a
/// range condition.
fn compare_for_query(actual: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (actual?, operand) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64()?;
            let b = b.as_f64()?;
            a.partial_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn projection_flag(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(MongoFrameError::InvalidQuery(
                "$project values must be 0 or 1".into(),
            )),
        },
        _ => Err(MongoFrameError::InvalidQuery(
            "$project values must be 0 or 1".into(),
        )),
    }
}

/// Include/exclude projection with the usual `_id` special case:
/// include mode keeps `_id` unless it is explicitly excluded.
fn apply_projection(doc: &Document, spec: &Map<String, Value>) -> Result<Document> {
    if spec.is_empty() {
        return Ok(doc.clone());
    }

    let mut include_mode = false;
    let mut excludes_beyond_id = false;
    for (field, value) in spec {
        if projection_flag(value)? {
            include_mode = true;
        } else if field != "_id" {
            excludes_beyond_id = true;
        }
    }
    if include_mode && excludes_beyond_id {
        return Err(MongoFrameError::InvalidQuery(
            "cannot mix inclusion and exclusion in $project".into(),
        ));
    }

    let mut result = Document::new();
    // iterate the document, not the spec, so field order survives
    for (field, value) in doc.iter() {
        let keep = if include_mode {
            match spec.get(field) {
                Some(flag) => projection_flag(flag)?,
                None => field == "_id",
            }
        } else {
            // exclude mode: every listed flag is 0
            !spec.contains_key(field)
        };
        if keep {
            result.insert(field.clone(), value.clone());
        }
    }
    Ok(result)
}

fn sort_documents(docs: &mut [Document], spec: &Map<String, Value>) -> Result<()> {
    let mut keys = Vec::with_capacity(spec.len());
    for (field, direction) in spec {
        match direction.as_i64() {
            Some(dir @ (1 | -1)) => keys.push((field.clone(), dir)),
            _ => {
                return Err(MongoFrameError::InvalidQuery(
                    "$sort direction must be 1 or -1".into(),
                ))
            }
        }
    }

    docs.sort_by(|a, b| {
        for (field, direction) in &keys {
            let cmp = compare_values(a.get(field), b.get(field));
            if cmp != Ordering::Equal {
                return if *direction == 1 { cmp } else { cmp.reverse() };
            }
        }
        Ordering::Equal
    });
    Ok(())
}

/// Total ordering over JSON values for sorting: missing < present,
/// same-kind values compare naturally, mixed kinds fall back to a
/// fixed type priority.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,

        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),

        (Some(a), Some(b)) => type_priority(a).cmp(&type_priority(b)),
    }
}

fn type_priority(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Bool(_) => 3,
        Value::Object(_) => 4,
        Value::Array(_) => 5,
    }
}
