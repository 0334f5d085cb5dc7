//! Turns the service's nested JSON records into domain values.
//!
//! Each record kind has a [`RecordMapper`] declaring the dotted paths it
//! reads. The declaration is used twice: as the `fields` selection sent to
//! the service, and to check a record before anything is built from it.

use serde_json::Value;

use crate::adapter::error::AdapterError;

pub mod error;
pub mod records;

/// Walks `path` (dot separated) into `value`.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}

pub trait RecordMapper: Sized {
    /// Paths that must hold a non-null value.
    const REQUIRED: &'static [&'static str];

    /// Paths that must be present but may be null.
    const OPTIONAL: &'static [&'static str] = &[];

    /// `(list, key)` pairs: `list` is an array whose every element has `key`.
    const LISTS: &'static [(&'static str, &'static str)] = &[];

    fn build(record: Record<'_>) -> Result<Self, AdapterError>;

    /// Comma separated field selection for this record kind.
    fn fields() -> String {
        Self::fields_under("")
    }

    /// Field selection for records nested under `prefix`.
    fn fields_under(prefix: &str) -> String {
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}.")
        };
        Self::REQUIRED
            .iter()
            .chain(Self::OPTIONAL)
            .map(|path| format!("{prefix}{path}"))
            .chain(
                Self::LISTS
                    .iter()
                    .map(|(list, key)| format!("{prefix}{list}.{key}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Checks every declared path, then builds the value.
    fn from_value(value: &Value) -> Result<Self, AdapterError> {
        for path in Self::REQUIRED {
            match lookup(value, path) {
                Some(v) if !v.is_null() => {}
                _ => return Err(AdapterError::MissingField(path.to_string())),
            }
        }
        for path in Self::OPTIONAL {
            if lookup(value, path).is_none() {
                return Err(AdapterError::MissingField(path.to_string()));
            }
        }
        for (list, key) in Self::LISTS {
            let entries = lookup(value, list)
                .ok_or_else(|| AdapterError::MissingField(list.to_string()))?
                .as_array()
                .ok_or_else(|| AdapterError::WrongType {
                    path: list.to_string(),
                    expected: "a list",
                })?;
            for (i, entry) in entries.iter().enumerate() {
                if entry.get(key).is_none_or(Value::is_null) {
                    return Err(AdapterError::MissingField(format!("{list}.{i}.{key}")));
                }
            }
        }
        Self::build(Record(value))
    }
}

/// A record whose declared paths have been checked.
#[derive(Clone, Copy)]
pub struct Record<'a>(&'a Value);

impl<'a> Record<'a> {
    fn get(&self, path: &str) -> Result<&'a Value, AdapterError> {
        lookup(self.0, path).ok_or_else(|| AdapterError::MissingField(path.to_string()))
    }

    pub fn string(&self, path: &str) -> Result<String, AdapterError> {
        self.opt_string(path)?
            .ok_or_else(|| AdapterError::MissingField(path.to_string()))
    }

    /// `None` for null
    pub fn opt_string(&self, path: &str) -> Result<Option<String>, AdapterError> {
        match self.get(path)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(AdapterError::WrongType {
                path: path.to_string(),
                expected: "a string",
            }),
        }
    }

    pub fn count(&self, path: &str) -> Result<usize, AdapterError> {
        self.get(path)?
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| AdapterError::WrongType {
                path: path.to_string(),
                expected: "a non-negative integer",
            })
    }

    pub fn list(&self, path: &str) -> Result<&'a [Value], AdapterError> {
        self.get(path)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| AdapterError::WrongType {
                path: path.to_string(),
                expected: "a list",
            })
    }

    /// Collects `key` of every element of the list at `path`, in list order.
    pub fn collect(&self, path: &str, key: &str) -> Result<Vec<String>, AdapterError> {
        self.list(path)?
            .iter()
            .enumerate()
            .map(|(i, entry)| Record(entry).string(key).map_err(|_| {
                AdapterError::MissingField(format!("{path}.{i}.{key}"))
            }))
            .collect()
    }
}
