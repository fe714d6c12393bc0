//! Projection of raw documents into typed records.
//!
//! Missing or empty fields get display defaults; timestamps are normalized to
//! epoch milliseconds.

use serde_json::Value;

use crate::models::{Document, JobUpdate, Notice, PushToken, Resource};

pub const DEFAULT_RESOURCE_TITLE: &str = "Untitled Resource";
pub const DEFAULT_RESOURCE_LINK: &str = "#";
pub const DEFAULT_NOTICE_TITLE: &str = "Update";

/// Resolve a document's creation time.
///
/// Order of preference: the store-assigned timestamp, a numeric `createdAt`
/// field, a `{seconds, nanoseconds}` server timestamp object, then `now_ms`
/// for a write whose server timestamp has not materialized yet.
pub fn normalize_created_at(document: &Document, now_ms: i64) -> i64 {
    if let Some(created_at) = document.created_at {
        return created_at;
    }

    match document.data.get("createdAt") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(now_ms),
        Some(Value::Object(ts)) => timestamp_object_millis(ts).unwrap_or(now_ms),
        _ => now_ms,
    }
}

fn timestamp_object_millis(ts: &serde_json::Map<String, Value>) -> Option<i64> {
    let seconds = ts
        .get("seconds")
        .or_else(|| ts.get("_seconds"))
        .and_then(Value::as_i64)?;
    let nanos = ts
        .get("nanoseconds")
        .or_else(|| ts.get("_nanoseconds"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(seconds * 1000 + nanos / 1_000_000)
}

/// String value of a field, or `None` when the field is missing, null or falsy.
fn text_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

pub fn project_resource(document: &Document, now_ms: i64) -> Resource {
    let data = &document.data;
    Resource {
        id: document.id.clone(),
        title: text_field(data, "title").unwrap_or_else(|| DEFAULT_RESOURCE_TITLE.to_string()),
        // Older documents were filed under "department".
        category: text_field(data, "category")
            .or_else(|| text_field(data, "department"))
            .unwrap_or_default(),
        semester: text_field(data, "semester").unwrap_or_default(),
        pdf_link: text_field(data, "pdfLink").unwrap_or_else(|| DEFAULT_RESOURCE_LINK.to_string()),
        created_at: normalize_created_at(document, now_ms),
    }
}

pub fn project_job(document: &Document, now_ms: i64) -> JobUpdate {
    let data = &document.data;
    JobUpdate {
        id: document.id.clone(),
        title: text_field(data, "title").unwrap_or_default(),
        description: text_field(data, "description").unwrap_or_default(),
        link: text_field(data, "link"),
        image_url: text_field(data, "imageUrl"),
        created_at: normalize_created_at(document, now_ms),
    }
}

pub fn project_notice(document: &Document, now_ms: i64) -> Notice {
    let data = &document.data;
    Notice {
        id: document.id.clone(),
        title: text_field(data, "title").unwrap_or_else(|| DEFAULT_NOTICE_TITLE.to_string()),
        text: text_field(data, "text").unwrap_or_default(),
        created_at: normalize_created_at(document, now_ms),
    }
}

pub fn project_push_token(document: &Document) -> PushToken {
    PushToken {
        token: text_field(&document.data, "token").unwrap_or_else(|| document.id.clone()),
        updated_at: document
            .data
            .get("updatedAt")
            .and_then(Value::as_i64)
            .unwrap_or_default(),
    }
}

pub fn project_resources(documents: &[Document], now_ms: i64) -> Vec<Resource> {
    documents.iter().map(|d| project_resource(d, now_ms)).collect()
}

pub fn project_jobs(documents: &[Document], now_ms: i64) -> Vec<JobUpdate> {
    documents.iter().map(|d| project_job(d, now_ms)).collect()
}

pub fn project_notices(documents: &[Document], now_ms: i64) -> Vec<Notice> {
    documents.iter().map(|d| project_notice(d, now_ms)).collect()
}
