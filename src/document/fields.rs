//! Typed field extraction from loosely-shaped documents.
//!
//! Documents written by older tooling are not uniform (integers stored as
//! `Int64`, timestamps stored as strings), so readers accept every shape that
//! carries the value and treat anything else as absent.

use crate::models::RecordError;
use crate::sync::datetime;
use bson::{Bson, Document, oid::ObjectId};
use chrono::NaiveDateTime;

pub fn object_id(doc: &Document) -> Result<ObjectId, RecordError> {
    match doc.get("_id") {
        Some(Bson::ObjectId(id)) => Ok(*id),
        Some(other) => Err(RecordError::InvalidField {
            field: "_id",
            value: other.to_string(),
        }),
        None => Err(RecordError::MissingField("_id")),
    }
}

pub fn required_str(doc: &Document, field: &'static str) -> Result<String, RecordError> {
    optional_str(doc, field)
        .filter(|s| !s.is_empty())
        .ok_or(RecordError::MissingField(field))
}

#[must_use]
pub fn optional_str(doc: &Document, field: &str) -> Option<String> {
    match doc.get(field) {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

#[must_use]
pub fn optional_i32(doc: &Document, field: &str) -> Option<i32> {
    match doc.get(field) {
        Some(Bson::Int32(v)) => Some(*v),
        Some(Bson::Int64(v)) => i32::try_from(*v).ok(),
        _ => None,
    }
}

/// Booleans also arrive as 0/1 integers from rows copied verbatim out of SQLite.
#[must_use]
pub fn bool_or(doc: &Document, field: &str, default: bool) -> bool {
    match doc.get(field) {
        Some(Bson::Boolean(b)) => *b,
        Some(Bson::Int32(v)) => *v != 0,
        Some(Bson::Int64(v)) => *v != 0,
        _ => default,
    }
}

#[must_use]
pub fn timestamp(doc: &Document, field: &str) -> Option<NaiveDateTime> {
    datetime::from_bson(doc.get(field))
}
