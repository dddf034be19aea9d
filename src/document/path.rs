//! Dot-path access into the document
//!
//! `settings.theme` walks object keys; a numeric segment indexes into an
//! array (`data.bookmarks.0.title`).

use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("'{segment}' in '{path}' is not an index into a list")]
    NotAnIndex { path: String, segment: String },

    #[error("index {index} is out of range for array of length {len} at '{path}'")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

fn segments(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(parts)
}

fn array_index(segment: &str, len: usize) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|i| *i < len)
}

/// Look up `path`; `None` as soon as a segment is missing or not a container
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let parts = segments(path).ok()?;

    parts.into_iter().try_fold(doc, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => array_index(segment, items.len()).map(|i| &items[i]),
        _ => None,
    })
}

/// Assign `value` at `path`, creating intermediate objects
///
/// A non-container found on the way is replaced by an empty object. Arrays
/// are never replaced: a segment into an array must index an existing
/// element, except the last one, which may also append at `len`.
pub fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let parts = segments(path)?;
    let (last, parents) = parts.split_last().ok_or(PathError::Empty)?;

    let mut current = doc;
    for segment in parents {
        current = descend(current, segment, path)?;
    }

    if let Value::Array(items) = &mut *current {
        let index = parse_index(last, path)?;
        let len = items.len();
        return match index.cmp(&len) {
            Ordering::Less => {
                items[index] = value;
                Ok(())
            }
            Ordering::Equal => {
                items.push(value);
                Ok(())
            }
            Ordering::Greater => Err(PathError::IndexOutOfRange {
                path: path.to_string(),
                index,
                len,
            }),
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
    Ok(())
}

fn parse_index(segment: &str, path: &str) -> Result<usize, PathError> {
    segment.parse().map_err(|_| PathError::NotAnIndex {
        path: path.to_string(),
        segment: segment.to_string(),
    })
}

fn descend<'a>(
    current: &'a mut Value,
    segment: &str,
    path: &str,
) -> Result<&'a mut Value, PathError> {
    match current {
        Value::Array(items) => {
            let index = parse_index(segment, path)?;
            let len = items.len();
            items
                .get_mut(index)
                .ok_or_else(|| PathError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len,
                })
        }
        other => {
            if !other.is_object() {
                *other = Value::Object(Map::new());
            }
            let Value::Object(map) = other else {
                unreachable!("replaced with an object above")
            };
            Ok(map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let doc = json!({ "settings": { "theme": "dark" } });
        assert_eq!(get_path(&doc, "settings.theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_get_missing_segment() {
        let doc = json!({ "settings": { "theme": "dark" } });
        assert_eq!(get_path(&doc, "settings.font.size"), None);
        assert_eq!(get_path(&doc, "preferences"), None);
    }

    #[test]
    fn test_get_through_primitive_is_none() {
        let doc = json!({ "settings": { "theme": "dark" } });
        assert_eq!(get_path(&doc, "settings.theme.length"), None);
    }

    #[test]
    fn test_get_array_index() {
        let doc = json!({ "data": { "bookmarks": [{ "title": "a" }, { "title": "b" }] } });
        assert_eq!(get_path(&doc, "data.bookmarks.1.title"), Some(&json!("b")));
        assert_eq!(get_path(&doc, "data.bookmarks.2"), None);
    }

    #[test]
    fn test_get_rejects_empty_segments() {
        let doc = json!({ "": { "": 1 } });
        assert_eq!(get_path(&doc, ""), None);
        assert_eq!(get_path(&doc, "."), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = json!({});
        set_path(&mut doc, "data.calendar.events", json!([])).unwrap();
        assert_eq!(doc, json!({ "data": { "calendar": { "events": [] } } }));
    }

    #[test]
    fn test_set_replaces_primitive_on_the_way() {
        let mut doc = json!({ "settings": "oops" });
        set_path(&mut doc, "settings.theme", json!("dark")).unwrap();
        assert_eq!(doc, json!({ "settings": { "theme": "dark" } }));
    }

    #[test]
    fn test_set_array_element_and_append() {
        let mut doc = json!({ "todos": [{ "done": false }] });
        set_path(&mut doc, "todos.0.done", json!(true)).unwrap();
        set_path(&mut doc, "todos.1", json!({ "done": false })).unwrap();
        assert_eq!(doc, json!({ "todos": [{ "done": true }, { "done": false }] }));

        let err = set_path(&mut doc, "todos.5", json!(null)).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfRange { index: 5, len: 2, .. }));
    }

    #[test]
    fn test_set_rejects_empty_path() {
        let mut doc = json!({});
        assert_eq!(set_path(&mut doc, "", json!(1)), Err(PathError::Empty));
        assert!(matches!(
            set_path(&mut doc, "settings..theme", json!(1)),
            Err(PathError::EmptySegment(_))
        ));
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_set_through_missing_element_keeps_list() {
        let mut doc = json!({ "data": { "bookmarks": [{ "id": 1 }, { "id": 2 }] } });
        let before = doc.clone();

        let err = set_path(&mut doc, "data.bookmarks.5.title", json!("x")).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfRange { index: 5, len: 2, .. }));
        let err = set_path(&mut doc, "data.bookmarks.2.title", json!("x")).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfRange { index: 2, len: 2, .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_named_key_on_list_is_rejected() {
        let mut doc = json!({ "data": { "todos": [{ "done": false }] } });
        let before = doc.clone();

        assert!(matches!(
            set_path(&mut doc, "data.todos.first.done", json!(true)),
            Err(PathError::NotAnIndex { .. })
        ));
        assert!(matches!(
            set_path(&mut doc, "data.todos.count", json!(3)),
            Err(PathError::NotAnIndex { .. })
        ));
        assert_eq!(doc, before);
    }
}
