//! Folder-tree projection (spec §4.8): turns the set of `Folder` documents in
//! a pack into a `_id -> descriptor` map usable to prefix extracted
//! filenames with their owning directory path.

use crate::document;
use crate::filename;
use crate::impl_prelude::*;

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FolderEntry {
  pub name: String,
  pub parent: Option<String>,
  pub doc_type: Option<String>,
  /// Slash-joined path from the projection root down to and including this
  /// folder, with no leading or trailing slash.
  pub path: String,
}

fn default_name(doc: &Value, id: &str) -> String {
  match document::name(doc) {
    Some(name) if !name.is_empty() => format!("{}_{}", filename::safe_name(name), id),
    _ => id.to_owned(),
  }
}

/// Builds the `_id -> descriptor` map for `folders`. `transform_name`, when
/// it returns `Some`, overrides a folder's derived name. When `group_by_type`
/// is set, a root folder's (one with no resolvable parent) document type is
/// prepended to its path; nested folders inherit that prefix transitively
/// through their parent's own path.
pub fn build_folder_map(
  folders: &[Value],
  group_by_type: bool,
  transform_name: Option<&dyn Fn(&Value) -> Option<String>>,
) -> AnyResult<HashMap<String, FolderEntry>> {
  let mut by_id: HashMap<String, &Value> = HashMap::new();
  for folder in folders {
    if let Some(id) = document::id(folder) {
      by_id.insert(id.to_owned(), folder);
    }
  }

  let mut paths: HashMap<String, String> = HashMap::new();
  for id in by_id.keys() {
    let mut visiting = Vec::new();
    resolve_path(id, &by_id, transform_name, group_by_type, &mut paths, &mut visiting)?;
  }

  let mut out = HashMap::with_capacity(by_id.len());
  for (id, doc) in &by_id {
    let name = match transform_name.and_then(|f| f(doc)) {
      Some(name) => name,
      None => default_name(doc, id),
    };
    out.insert(
      id.clone(),
      FolderEntry {
        name,
        parent: document::folder(doc).map(str::to_owned),
        doc_type: doc.get("type").and_then(Value::as_str).map(str::to_owned),
        path: paths.get(id).cloned().unwrap_or_default(),
      },
    );
  }
  Ok(out)
}

fn resolve_path(
  id: &str,
  by_id: &HashMap<String, &Value>,
  transform_name: Option<&dyn Fn(&Value) -> Option<String>>,
  group_by_type: bool,
  paths: &mut HashMap<String, String>,
  visiting: &mut Vec<String>,
) -> AnyResult<String> {
  if let Some(cached) = paths.get(id) {
    return Ok(cached.clone());
  }
  if visiting.iter().any(|seen| seen == id) {
    bail!("cyclic folder parent chain involving '{}'", id);
  }
  let doc = *by_id.get(id).ok_or_else(|| format_err!("folder '{}' is referenced but absent from the pack", id))?;
  visiting.push(id.to_owned());

  let name = match transform_name.and_then(|f| f(doc)) {
    Some(name) => name,
    None => default_name(doc, id),
  };

  let parent_path = match document::folder(doc) {
    Some(parent_id) if by_id.contains_key(parent_id) => {
      Some(resolve_path(parent_id, by_id, transform_name, group_by_type, paths, visiting)?)
    }
    _ => None,
  };

  let mut path = match &parent_path {
    Some(parent_path) => format!("{}/{}", parent_path, name),
    None => name,
  };
  if group_by_type && parent_path.is_none() {
    if let Some(doc_type) = doc.get("type").and_then(Value::as_str) {
      path = format!("{}/{}", doc_type, path);
    }
  }

  visiting.pop();
  paths.insert(id.to_owned(), path.clone());
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn nested_folders_join_parent_path() {
    let folders = vec![
      json!({ "_id": "root", "name": "Monsters", "type": "Actor" }),
      json!({ "_id": "child", "name": "Dragons", "type": "Actor", "folder": "root" }),
    ];
    let map = build_folder_map(&folders, false, None).unwrap();
    assert_eq!(map["root"].path, "Monsters_root");
    assert_eq!(map["child"].path, "Monsters_root/Dragons_child");
  }

  #[test]
  fn group_by_type_prefixes_only_the_root() {
    let folders = vec![
      json!({ "_id": "root", "name": "Monsters", "type": "Actor" }),
      json!({ "_id": "child", "name": "Dragons", "type": "Actor", "folder": "root" }),
    ];
    let map = build_folder_map(&folders, true, None).unwrap();
    assert_eq!(map["root"].path, "Actor/Monsters_root");
    assert_eq!(map["child"].path, "Actor/Monsters_root/Dragons_child");
  }

  #[test]
  fn cyclic_parents_are_rejected() {
    let folders = vec![
      json!({ "_id": "a", "name": "A", "folder": "b" }),
      json!({ "_id": "b", "name": "B", "folder": "a" }),
    ];
    assert!(build_folder_map(&folders, false, None).is_err());
  }

  #[test]
  fn transform_name_overrides_default() {
    let folders = vec![json!({ "_id": "root", "name": "Monsters" })];
    let map = build_folder_map(&folders, false, Some(&|_doc: &Value| Some("Custom".to_owned()))).unwrap();
    assert_eq!(map["root"].path, "Custom");
  }
}
