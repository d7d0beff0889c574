//! Input validation for task bodies and list queries.
//!
//! Validators take untyped input (a JSON body or a query-string map) and
//! return normalized typed values with defaults applied. Every problem found
//! is collected, so a single response can report all bad fields at once.

use super::task::{Category, NewTask, Priority, SortField, SortOrder, StatusFilter, TaskPatch, TaskQuery};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, reason: impl Into<String>) -> Self {
        ValidationError {
            errors: vec![FieldError {
                field: field.to_string(),
                reason: reason.into(),
            }],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| format!("{}: {}", e.field, e.reason)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates field errors while a body is being read.
#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            reason: reason.into(),
        });
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { errors: self.errors })
        }
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or_else(|| ValidationError::single("body", "expected a JSON object"))
}

/// `Some(value)` for present, non-null keys.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn check_title(errors: &mut Collector, value: &Value) -> Option<String> {
    let Some(title) = value.as_str() else {
        errors.push("title", "expected a string");
        return None;
    };
    let len = title.chars().count();
    if len == 0 {
        errors.push("title", "is required");
        None
    } else if len > TITLE_MAX_CHARS {
        errors.push("title", format!("must be at most {} characters", TITLE_MAX_CHARS));
        None
    } else {
        Some(title.to_string())
    }
}

fn check_description(errors: &mut Collector, value: &Value) -> Option<String> {
    let Some(description) = value.as_str() else {
        errors.push("description", "expected a string");
        return None;
    };
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push("description", format!("must be at most {} characters", DESCRIPTION_MAX_CHARS));
        return None;
    }
    Some(description.to_string())
}

fn check_enum<T: FromStr<Err = super::task::ParseEnumError>>(errors: &mut Collector, field: &str, value: &Value) -> Option<T> {
    let Some(text) = value.as_str() else {
        errors.push(field, "expected a string");
        return None;
    };
    match text.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(field, e.to_string());
            None
        }
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// `Ok(None)` for an empty string, the date otherwise.
fn check_due_date(errors: &mut Collector, value: &Value) -> Option<Option<NaiveDate>> {
    let Some(text) = value.as_str() else {
        errors.push("due_date", "expected a YYYY-MM-DD string");
        return None;
    };
    if text.is_empty() {
        return Some(None);
    }
    match parse_date(text) {
        Some(date) => Some(Some(date)),
        None => {
            errors.push("due_date", "expected a YYYY-MM-DD date");
            None
        }
    }
}

/// Validates a creation body. `title` is required; everything else defaults.
pub fn validate_create(body: &Value) -> Result<NewTask, ValidationError> {
    let obj = as_object(body)?;
    let mut errors = Collector::default();
    let mut task = NewTask::default();

    match present(obj, "title") {
        Some(value) => task.title = check_title(&mut errors, value).unwrap_or_default(),
        None => errors.push("title", "is required"),
    }
    if let Some(value) = present(obj, "description") {
        task.description = check_description(&mut errors, value).filter(|d| !d.is_empty());
    }
    if let Some(value) = present(obj, "priority") {
        task.priority = check_enum(&mut errors, "priority", value).unwrap_or_default();
    }
    if let Some(value) = present(obj, "category") {
        task.category = check_enum(&mut errors, "category", value).unwrap_or_default();
    }
    if let Some(value) = present(obj, "due_date") {
        task.due_date = check_due_date(&mut errors, value).flatten();
    }

    errors.finish(task)
}

/// Validates a partial update. `null` or `""` for `description` or `due_date` clears the field.
pub fn validate_update(body: &Value) -> Result<TaskPatch, ValidationError> {
    let obj = as_object(body)?;
    let mut errors = Collector::default();
    let mut patch = TaskPatch::default();

    if let Some(value) = present(obj, "title") {
        patch.title = check_title(&mut errors, value);
    }
    match obj.get("description") {
        Some(Value::Null) => patch.description = Some(None),
        Some(value) => {
            patch.description = check_description(&mut errors, value).map(|d| Some(d).filter(|d| !d.is_empty()));
        }
        None => {}
    }
    if let Some(value) = present(obj, "completed") {
        match value.as_bool() {
            Some(completed) => patch.completed = Some(completed),
            None => errors.push("completed", "expected a boolean"),
        }
    }
    if let Some(value) = present(obj, "priority") {
        patch.priority = check_enum(&mut errors, "priority", value);
    }
    if let Some(value) = present(obj, "category") {
        patch.category = check_enum(&mut errors, "category", value);
    }
    match obj.get("due_date") {
        Some(Value::Null) => patch.due_date = Some(None),
        Some(value) => patch.due_date = check_due_date(&mut errors, value),
        None => {}
    }
    if let Some(value) = present(obj, "order_index") {
        match value.as_i64() {
            Some(order_index) => patch.order_index = Some(order_index),
            None => errors.push("order_index", "expected an integer"),
        }
    }

    errors.finish(patch)
}

fn query_enum<T: FromStr<Err = super::task::ParseEnumError>>(
    errors: &mut Collector,
    params: &HashMap<String, String>,
    key: &str,
) -> Option<T> {
    let text = params.get(key).map(|v| v.as_str()).filter(|v| !v.is_empty())?;
    match text.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(key, e.to_string());
            None
        }
    }
}

/// Validates list query parameters (`status`, `priority`, `category`, `search`, `sortBy`, `sortOrder`).
pub fn validate_query(params: &HashMap<String, String>) -> Result<TaskQuery, ValidationError> {
    let mut errors = Collector::default();

    let query = TaskQuery {
        status: query_enum::<StatusFilter>(&mut errors, params, "status").unwrap_or_default(),
        priority: query_enum::<Priority>(&mut errors, params, "priority"),
        category: query_enum::<Category>(&mut errors, params, "category"),
        search: params.get("search").filter(|s| !s.is_empty()).cloned(),
        sort_by: query_enum::<SortField>(&mut errors, params, "sortBy").unwrap_or_default(),
        sort_order: query_enum::<SortOrder>(&mut errors, params, "sortOrder").unwrap_or_default(),
    };

    errors.finish(query)
}
