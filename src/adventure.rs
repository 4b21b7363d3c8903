//! The adventure expander (spec §4.9): splits an Adventure document's inline
//! embedded collections into standalone files on extract, and reads them
//! back in on compile.

use crate::catalog;
use crate::document;
use crate::filename;
use crate::impl_prelude::*;
use crate::serializer;

use serde_json::Value;
use std::path::Path;

/// One subdocument pulled out of an Adventure, with the path (relative to
/// the adventure's own directory) it was assigned and the adventure-embedded
/// collection it came from.
pub struct ExpandedFile {
  pub relative_path: String,
  pub collection: &'static str,
  pub document: Value,
}

/// Replaces every inline embedded-collection entry of `adventure` with a
/// path string, returning the extracted subdocuments alongside the paths
/// they were assigned. Collections absent from `adventure` or not arrays are
/// left untouched. `ext` is the destination file extension ("json" or
/// "yml"). When `folders` is set, each subdocument's path is nested under a
/// `<collection>/` subfolder (the adventure is a directory in this mode, see
/// [`crate::extract`]); otherwise the path is just the bare filename, a flat
/// sibling of the adventure's own file (spec §4.9, end-to-end Scenario E).
pub fn expand(adventure: &mut Value, ext: &str, folders: bool) -> AnyResult<Vec<ExpandedFile>> {
  let mut files = Vec::new();
  let obj = match adventure.as_object_mut() {
    Some(obj) => obj,
    None => return Ok(files),
  };

  for collection in catalog::ADVENTURE_EMBEDDED_COLLECTIONS {
    let items = match obj.get_mut(*collection).and_then(Value::as_array_mut) {
      Some(items) => items,
      None => continue,
    };

    let mut paths = Vec::with_capacity(items.len());
    for item in items.iter_mut() {
      let id = document::id(item).unwrap_or("unknown").to_owned();
      let filename = filename::derive_filename(document::name(item), &id, &id, ext);
      let relative_path = if folders { format!("{}/{}", collection, filename) } else { filename };
      files.push(ExpandedFile { relative_path: relative_path.clone(), collection, document: item.take() });
      paths.push(Value::String(relative_path));
    }
    *items = paths;
  }

  Ok(files)
}

/// Reverses [`expand`]: for every string-valued entry in an
/// adventure-embedded collection, reads the file at that path (resolved
/// against `base_dir`, the directory containing the adventure's own source
/// file) and substitutes the parsed document back into place.
pub fn reconstruct(adventure: &mut Value, base_dir: &Path) -> AnyResult<()> {
  let obj = match adventure.as_object_mut() {
    Some(obj) => obj,
    None => return Ok(()),
  };

  for collection in catalog::ADVENTURE_EMBEDDED_COLLECTIONS {
    let items = match obj.get_mut(*collection).and_then(Value::as_array_mut) {
      Some(items) => items,
      None => continue,
    };
    for item in items.iter_mut() {
      if let Some(relative_path) = item.as_str() {
        let full_path = base_dir.join(relative_path);
        let doc = serializer::read_file(&full_path)
          .with_context(|| format!("failed to read adventure subdocument '{}'", full_path.display()))?;
        *item = doc;
      }
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn expand_replaces_inline_documents_with_paths() {
    let mut adventure =
      json!({ "_id": "adv1", "actors": [{ "_id": "a1", "name": "Hero" }], "items": [] });
    let files = expand(&mut adventure, "json", true).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative_path, "actors/Hero_a1.json");
    assert_eq!(adventure["actors"], json!(["actors/Hero_a1.json"]));
    assert_eq!(adventure["items"], json!([]));
  }

  #[test]
  fn expand_without_folders_yields_flat_sibling_paths() {
    let mut adventure = json!({ "_id": "adv1", "items": [{ "_id": "i1", "name": "Sword" }] });
    let files = expand(&mut adventure, "json", false).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative_path, "Sword_i1.json");
    assert_eq!(adventure["items"], json!(["Sword_i1.json"]));
  }

  #[test]
  fn reconstruct_reads_referenced_files_back_in() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("actors")).unwrap();
    fs::write(dir.path().join("actors/Hero_a1.json"), r#"{"_id":"a1","name":"Hero"}"#).unwrap();

    let mut adventure = json!({ "_id": "adv1", "actors": ["actors/Hero_a1.json"] });
    reconstruct(&mut adventure, dir.path()).unwrap();
    assert_eq!(adventure["actors"], json!([{ "_id": "a1", "name": "Hero" }]));
  }

  #[test]
  fn round_trip_through_expand_and_reconstruct() {
    let dir = tempdir().unwrap();
    let mut adventure = json!({ "_id": "adv1", "actors": [{ "_id": "a1", "name": "Hero" }] });
    let files = expand(&mut adventure, "json", true).unwrap();
    for file in &files {
      let path = dir.path().join(&file.relative_path);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(&path, serde_json::to_string(&file.document).unwrap()).unwrap();
    }
    reconstruct(&mut adventure, dir.path()).unwrap();
    assert_eq!(adventure["actors"], json!([{ "_id": "a1", "name": "Hero" }]));
  }
}
