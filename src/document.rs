//! Small accessors over the reserved fields of a document (spec §3). A
//! document is represented as a plain `serde_json::Value`; this module is the
//! only place that knows the reserved-field names.

use serde_json::Value;

pub const FIELD_ID: &str = "_id";
pub const FIELD_KEY: &str = "_key";
pub const FIELD_NAME: &str = "name";
pub const FIELD_FOLDER: &str = "folder";
pub const FIELD_STATS: &str = "_stats";

pub fn id(doc: &Value) -> Option<&str> {
  doc.get(FIELD_ID)?.as_str()
}

pub fn key(doc: &Value) -> Option<&str> {
  doc.get(FIELD_KEY)?.as_str()
}

pub fn name(doc: &Value) -> Option<&str> {
  doc.get(FIELD_NAME)?.as_str()
}

pub fn folder(doc: &Value) -> Option<&str> {
  doc.get(FIELD_FOLDER)?.as_str()
}

pub fn stats(doc: &Value) -> Option<&Value> {
  doc.get(FIELD_STATS)
}

/// Removes `_key` from `doc` in place, returning its prior value if present.
pub fn take_key(doc: &mut Value) -> Option<Value> {
  doc.as_object_mut()?.remove(FIELD_KEY)
}

pub fn set_key(doc: &mut Value, key: impl Into<Value>) {
  if let Some(map) = doc.as_object_mut() {
    map.insert(FIELD_KEY.to_owned(), key.into());
  }
}

/// Overlays every volatile field present in `source`'s `_stats` onto
/// `target`'s `_stats`. No-op unless *both* `target` and `source` already
/// have a `_stats` object (spec §4.10) — in particular this never fabricates
/// `_stats` on a `target` that didn't have one to begin with.
pub fn overlay_volatile_fields(target: &mut Value, source: &Value) {
  let source_stats = match source.get(FIELD_STATS).and_then(Value::as_object) {
    Some(stats) => stats,
    None => return,
  };

  let target_obj = match target.as_object_mut() {
    Some(obj) => obj,
    None => return,
  };
  let target_stats = match target_obj.get_mut(FIELD_STATS).and_then(Value::as_object_mut) {
    Some(obj) => obj,
    None => return,
  };

  for field in crate::catalog::VOLATILE_FIELDS {
    if let Some(value) = source_stats.get(*field) {
      target_stats.insert((*field).to_owned(), value.clone());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn overlay_copies_only_volatile_fields() {
    let mut target = json!({
      "_id": "a",
      "name": "Hero",
      "_stats": { "createdTime": 1, "modifiedTime": 1, "customStat": "keep-me" },
    });
    let source = json!({ "_stats": { "createdTime": 999, "modifiedTime": 999, "customStat": "ignored" } });
    overlay_volatile_fields(&mut target, &source);
    assert_eq!(target["_stats"]["createdTime"], 999);
    assert_eq!(target["_stats"]["modifiedTime"], 999);
    assert_eq!(target["_stats"]["customStat"], "keep-me");
  }

  #[test]
  fn overlay_is_noop_without_source_stats() {
    let mut target = json!({ "_stats": { "createdTime": 1 } });
    let before = target.clone();
    overlay_volatile_fields(&mut target, &json!({}));
    assert_eq!(target, before);
  }

  #[test]
  fn overlay_is_noop_without_target_stats() {
    let mut target = json!({ "_id": "a", "name": "Hero" });
    let before = target.clone();
    let source = json!({ "_stats": { "createdTime": 999 } });
    overlay_volatile_fields(&mut target, &source);
    assert_eq!(target, before);
  }
}
