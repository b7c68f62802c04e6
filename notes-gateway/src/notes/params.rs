//! Coercion of loosely typed request input into typed note parameters.

use std::collections::HashMap;

use notes_db::{NewNote, NoteChanges};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Parse a tri-state boolean from a JSON value.
///
/// Booleans pass through, strings go through [`parse_flag_str`], anything
/// else is unspecified.
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_flag_str(s),
        _ => None,
    }
}

pub fn parse_flag_str(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Normalize a tags value into a list of non-blank strings.
///
/// Arrays keep their order, comma-separated strings are split and trimmed,
/// and any other value yields an empty list. Returns `None` for an array
/// holding a non-string element.
pub fn normalize_tags(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(tag) if tag.trim().is_empty() => None,
                Value::String(tag) => Some(Some(tag.clone())),
                _ => Some(None),
            })
            .collect(),
        Value::String(raw) => Some(
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => Some(Vec::new()),
    }
}

/// Integer prefix of `raw`, ignoring leading whitespace (`"12abc"` is 12).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

/// Options accepted by the note listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Case-insensitive substring, matched as given
    pub q: Option<String>,
    /// Exact tag, surrounding whitespace removed
    pub tag: Option<String>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            q: None,
            tag: None,
            pinned: None,
            archived: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListParams {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let text = |key: &str| query.get(key).map(String::as_str);

        let page = text("page")
            .and_then(parse_leading_int)
            .map(|n| usize::try_from(n.max(1)).unwrap_or(usize::MAX))
            .unwrap_or(1);

        let limit = match text("limit").and_then(parse_leading_int) {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(n) => n.clamp(1, MAX_PAGE_SIZE as i64) as usize,
        };

        Self {
            q: text("q").filter(|q| !q.is_empty()).map(str::to_string),
            tag: text("tag")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            pinned: text("pinned").and_then(parse_flag_str),
            archived: text("archived").and_then(parse_flag_str),
            page,
            limit,
        }
    }
}

/// Validated fields for a new note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub archived: bool,
}

impl NoteDraft {
    pub fn into_new_note(self, user_id: &str) -> NewNote {
        NewNote {
            user_id: user_id.to_string(),
            title: self.title,
            content: self.content,
            tags: self.tags,
            pinned: self.pinned,
            archived: self.archived,
        }
    }
}

fn as_object(body: &Value) -> ApiResult<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ApiError::validation("Invalid JSON body"))
}

fn trimmed_title(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn parse_note_draft(body: &Value) -> ApiResult<NoteDraft> {
    let fields = as_object(body)?;

    let title = fields
        .get("title")
        .and_then(trimmed_title)
        .ok_or_else(|| ApiError::validation("Title is required"))?;

    let tags = match fields.get("tags") {
        Some(value) => normalize_tags(value).ok_or_else(|| ApiError::validation("Invalid tags"))?,
        None => Vec::new(),
    };

    Ok(NoteDraft {
        title,
        content: fields
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        tags,
        pinned: fields.get("pinned").and_then(parse_flag).unwrap_or(false),
        archived: fields.get("archived").and_then(parse_flag).unwrap_or(false),
    })
}

/// Validate a partial update. Keys absent from the body stay `None`.
pub fn parse_note_patch(body: &Value) -> ApiResult<NoteChanges> {
    let fields = as_object(body)?;
    let mut changes = NoteChanges::default();

    if let Some(value) = fields.get("title") {
        changes.title = Some(trimmed_title(value).ok_or_else(|| ApiError::validation("Invalid title"))?);
    }
    if let Some(value) = fields.get("content") {
        let content = value
            .as_str()
            .ok_or_else(|| ApiError::validation("Invalid content"))?;
        changes.content = Some(content.to_string());
    }
    if let Some(value) = fields.get("tags") {
        changes.tags = Some(normalize_tags(value).ok_or_else(|| ApiError::validation("Invalid tags"))?);
    }
    if let Some(value) = fields.get("pinned") {
        changes.pinned =
            Some(parse_flag(value).ok_or_else(|| ApiError::validation("Invalid pinned value"))?);
    }
    if let Some(value) = fields.get("archived") {
        changes.archived =
            Some(parse_flag(value).ok_or_else(|| ApiError::validation("Invalid archived value"))?);
    }

    Ok(changes)
}
