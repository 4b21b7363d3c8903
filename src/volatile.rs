//! The volatile-diff gate (spec §4.10): keeps a checked-in source file
//! untouched when an extracted entry differs from it only in `_stats`
//! volatile fields.

use crate::catalog::{self, Arity};
use crate::document;
use crate::serializer;

use serde_json::Value;
use std::path::Path;

/// Compares `candidate` (freshly extracted) against the file at
/// `existing_path` (if any). Any failure to read or parse the existing file
/// is treated as "there is nothing to diff against" and `candidate` is
/// returned unchanged. Otherwise every volatile `_stats` field is overlaid
/// from the existing document onto a clone of `candidate`, recursively
/// through `collection`'s embedded slots (matched by `_id`); if the result is
/// then deep-equal to the existing document, the existing document is
/// returned so the file on disk stays byte-identical.
pub fn gate(candidate: &Value, existing_path: &Path, collection: &str) -> Value {
  let existing = match serializer::read_file(existing_path) {
    Ok(doc) => doc,
    Err(_) => return candidate.clone(),
  };

  let mut overlaid = candidate.clone();
  overlay_recursive(&mut overlaid, &existing, collection);

  if overlaid == existing {
    existing
  } else {
    candidate.clone()
  }
}

/// Overlays volatile fields between `candidate` and `existing` at every
/// matching node of their shared hierarchy. A `collection` name the catalog
/// doesn't recognize is treated as a leaf — no embedded slots to recurse
/// into — rather than an error (spec §9 Open Question 3), since expanded
/// adventure subdocuments are diffed under their own primary-type names,
/// some of which (e.g. a Folder) have no embedded collections at all.
fn overlay_recursive(candidate: &mut Value, existing: &Value, collection: &str) {
  document::overlay_volatile_fields(candidate, existing);

  if !catalog::is_known_root(collection) {
    return;
  }

  for (name, arity) in catalog::embedded_collections_of(collection) {
    match arity {
      Arity::Array => {
        let existing_items = match existing.get(*name).and_then(Value::as_array) {
          Some(items) => items.clone(),
          None => continue,
        };
        if let Some(cand_items) = candidate.get_mut(*name).and_then(Value::as_array_mut) {
          for cand_item in cand_items.iter_mut() {
            let id = match document::id(cand_item) {
              Some(id) => id.to_owned(),
              None => continue,
            };
            if let Some(existing_item) = existing_items.iter().find(|item| document::id(item) == Some(id.as_str())) {
              overlay_recursive(cand_item, existing_item, name);
            }
          }
        }
      }
      Arity::Single => {
        let existing_item = existing.get(*name).cloned();
        if let (Some(cand_item), Some(existing_item)) = (candidate.get_mut(*name), existing_item) {
          if !cand_item.is_null() && !existing_item.is_null() {
            overlay_recursive(cand_item, &existing_item, name);
          }
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn keeps_existing_when_only_volatile_fields_differ() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Hero_aaa.json");
    let existing = json!({ "_id": "aaa", "name": "Hero", "_stats": { "createdTime": 1 } });
    fs::write(&path, serde_json::to_string(&existing).unwrap()).unwrap();

    let candidate = json!({ "_id": "aaa", "name": "Hero", "_stats": { "createdTime": 999 } });
    let result = gate(&candidate, &path, "actors");
    assert_eq!(result, existing);
  }

  #[test]
  fn writes_candidate_when_non_volatile_fields_differ() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Hero_aaa.json");
    let existing = json!({ "_id": "aaa", "name": "Hero", "_stats": { "createdTime": 1 } });
    fs::write(&path, serde_json::to_string(&existing).unwrap()).unwrap();

    let candidate = json!({ "_id": "aaa", "name": "Hero Prime", "_stats": { "createdTime": 999 } });
    let result = gate(&candidate, &path, "actors");
    assert_eq!(result, candidate);
  }

  #[test]
  fn missing_existing_file_writes_candidate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let candidate = json!({ "_id": "aaa" });
    assert_eq!(gate(&candidate, &path, "actors"), candidate);
  }

  #[test]
  fn candidate_without_stats_is_written_even_if_existing_has_stats() {
    // Only the existing document has `_stats`; per spec the overlay requires
    // *both* sides to have it, so nothing is fabricated on the candidate and
    // the (real) difference causes the candidate to be written.
    let dir = tempdir().unwrap();
    let path = dir.path().join("Hero_aaa.json");
    let existing = json!({ "_id": "aaa", "name": "Hero", "_stats": { "createdTime": 1 } });
    fs::write(&path, serde_json::to_string(&existing).unwrap()).unwrap();

    let candidate = json!({ "_id": "aaa", "name": "Hero" });
    let result = gate(&candidate, &path, "actors");
    assert_eq!(result, candidate);
  }

  #[test]
  fn unknown_collection_is_treated_as_leaf() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Folder_root.json");
    let existing = json!({ "_id": "root", "_stats": { "createdTime": 1 } });
    fs::write(&path, serde_json::to_string(&existing).unwrap()).unwrap();

    let candidate = json!({ "_id": "root", "_stats": { "createdTime": 999 } });
    let result = gate(&candidate, &path, "Folder");
    assert_eq!(result, existing);
  }

  #[test]
  fn embedded_documents_are_matched_by_id_and_overlaid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Hero_aaa.json");
    let existing = json!({
      "_id": "aaa",
      "items": [{ "_id": "i1", "_stats": { "createdTime": 1 } }],
    });
    fs::write(&path, serde_json::to_string(&existing).unwrap()).unwrap();

    let candidate = json!({
      "_id": "aaa",
      "items": [{ "_id": "i1", "_stats": { "createdTime": 999 } }],
    });
    let result = gate(&candidate, &path, "actors");
    assert_eq!(result, existing);
  }
}
