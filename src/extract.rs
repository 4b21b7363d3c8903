//! The extract orchestrator (spec §4.12): tears a pack down into a directory
//! of source files, against either backend, through a crash-safe staging
//! directory.

use crate::adventure;
use crate::catalog;
use crate::document;
use crate::error::PackError;
use crate::filename;
use crate::folder::{self, FolderEntry};
use crate::impl_prelude::*;
use crate::key;
use crate::resolver::{DocumentTypeResolver, StaticResolver};
use crate::serializer::{self, JsonOptions, YamlOptions};
use crate::store::log::LogStore;
use crate::store::sorted::SortedStore;
use crate::volatile;
use crate::walker;

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

/// Options accepted by [`extract_pack`] (spec §6).
pub struct ExtractOptions {
  pub nedb: bool,
  pub yaml: bool,
  pub yaml_options: YamlOptions,
  pub json_options: JsonOptions,
  /// Emits an `info!` line per extracted entry; see [`crate::compile::CompileOptions::log`].
  pub log: bool,
  pub document_type: Option<String>,
  pub collection: Option<String>,
  pub clean: bool,
  pub folders: bool,
  pub expand_adventures: bool,
  pub omit_volatile: bool,
  pub transform_entry: Option<Box<dyn Fn(&mut Value) -> AnyResult<bool>>>,
  pub transform_name: Option<Box<dyn Fn(&Value) -> Option<String>>>,
  pub transform_folder_name: Option<Box<dyn Fn(&Value) -> Option<String>>>,
  pub resolver: Box<dyn DocumentTypeResolver>,
}

impl Default for ExtractOptions {
  fn default() -> Self {
    Self {
      nedb: false,
      yaml: false,
      yaml_options: YamlOptions::default(),
      json_options: JsonOptions::default(),
      log: false,
      document_type: None,
      collection: None,
      clean: false,
      folders: false,
      expand_adventures: false,
      omit_volatile: false,
      transform_entry: None,
      transform_name: None,
      transform_folder_name: None,
      resolver: Box::new(StaticResolver),
    }
  }
}

impl std::fmt::Debug for ExtractOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ExtractOptions")
      .field("nedb", &self.nedb)
      .field("yaml", &self.yaml)
      .field("log", &self.log)
      .field("document_type", &self.document_type)
      .field("collection", &self.collection)
      .field("clean", &self.clean)
      .field("folders", &self.folders)
      .field("expand_adventures", &self.expand_adventures)
      .field("omit_volatile", &self.omit_volatile)
      .field("transform_entry", &self.transform_entry.as_ref().map(|_| "<fn>"))
      .field("transform_name", &self.transform_name.as_ref().map(|_| "<fn>"))
      .field("transform_folder_name", &self.transform_folder_name.as_ref().map(|_| "<fn>"))
      .finish()
  }
}

fn has_db_extension(path: &Path) -> bool {
  path.extension().and_then(|ext| ext.to_str()) == Some("db")
}

fn file_ext(options: &ExtractOptions) -> &'static str {
  if options.yaml {
    "yml"
  } else {
    "json"
  }
}

/// The per-invocation temporary directory extraction writes into before
/// being published to `dest`. Always removed on drop, success or failure.
struct StagingDir {
  path: PathBuf,
}

impl StagingDir {
  fn create() -> AnyResult<Self> {
    let path = std::env::temp_dir().join(format!("compendium-pack-{}", Uuid::new_v4()));
    fs::create_dir_all(&path).with_context(|| format!("failed to create staging directory '{}'", path.display()))?;
    Ok(Self { path })
  }
}

impl Drop for StagingDir {
  fn drop(&mut self) {
    if let Err(err) = fs::remove_dir_all(&self.path) {
      if err.kind() != std::io::ErrorKind::NotFound {
        warn!("failed to remove staging directory '{}': {}", self.path.display(), err);
      }
    }
  }
}

fn remove_dir_with_retry(path: &Path) -> AnyResult<()> {
  const ATTEMPTS: u32 = 10;
  let mut last_err = None;
  for attempt in 0..ATTEMPTS {
    match fs::remove_dir_all(path) {
      Ok(()) => return Ok(()),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
      Err(err) => {
        last_err = Some(err);
        if attempt + 1 < ATTEMPTS {
          thread::sleep(Duration::from_millis(50));
        }
      }
    }
  }
  Err(last_err.unwrap()).with_context(|| format!("failed to remove '{}' after {} attempts", path.display(), ATTEMPTS))
}

fn copy_dir_recursive(from: &Path, to: &Path) -> AnyResult<()> {
  for entry in walkdir::WalkDir::new(from) {
    let entry = entry.with_context(|| format!("failed to walk staging directory '{}'", from.display()))?;
    let relative = entry.path().strip_prefix(from).expect("walkdir entries are under `from`");
    let target = to.join(relative);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target).with_context(|| format!("failed to create directory '{}'", target.display()))?;
    } else {
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::copy(entry.path(), &target)
        .with_context(|| format!("failed to copy '{}' to '{}'", entry.path().display(), target.display()))?;
    }
  }
  Ok(())
}

fn resolve_collection(options: &ExtractOptions) -> AnyResult<String> {
  if let Some(collection) = &options.collection {
    return Ok(collection.clone());
  }
  if let Some(document_type) = &options.document_type {
    if let Some(collection) = options.resolver.resolve(document_type) {
      return Ok(collection);
    }
  }
  Err(PackError::MissingType.into())
}

fn default_filename(doc: &Value, id_hint: &str, ext: &str) -> String {
  filename::derive_filename(document::name(doc), id_hint, id_hint, ext)
}

pub fn extract_pack(src: &Path, dest: &Path, options: &ExtractOptions) -> AnyResult<()> {
  if options.nedb && !has_db_extension(src) {
    return Err(PackError::BadTarget { path: src.to_owned() }.into());
  }
  let collection_hint = if options.nedb { Some(resolve_collection(options)?) } else { None };

  fs::create_dir_all(dest).with_context(|| format!("failed to create destination directory '{}'", dest.display()))?;

  let staging = StagingDir::create()?;
  if options.nedb {
    extract_log_store(src, &staging.path, dest, collection_hint.as_deref().unwrap(), options)?;
  } else {
    extract_sorted_store(src, &staging.path, dest, options)?;
  }

  if options.clean {
    remove_dir_with_retry(dest)?;
  }
  copy_dir_recursive(&staging.path, dest)
}

fn extract_log_store(src: &Path, staging: &Path, dest: &Path, collection: &str, options: &ExtractOptions) -> AnyResult<()> {
  let store = LogStore::open_existing(src).with_context(|| format!("failed to open log store '{}'", src.display()))?;
  let ext = file_ext(options);

  for mut doc in store.find_all() {
    walker::apply(&mut doc, collection, None, (Vec::<String>::new(), Vec::<String>::new()), &mut |
      node,
      node_collection,
      _index,
      (parent_sublevel, parent_id): PathState,
    | -> AnyResult<PathState> {
      let node_id = document::id(node).unwrap_or("").to_owned();
      let mut sublevel_parts = parent_sublevel;
      sublevel_parts.push(node_collection.to_owned());
      let mut id_parts = parent_id;
      id_parts.push(node_id);
      let node_key = key::encode(sublevel_parts.iter().map(String::as_str), id_parts.iter().map(String::as_str));
      document::set_key(node, node_key);
      Ok((sublevel_parts, id_parts))
    })?;

    if let Some(transform) = &options.transform_entry {
      if !transform(&mut doc)? {
        continue;
      }
    }

    let id = document::id(&doc).unwrap_or("unknown").to_owned();
    let filename = match &options.transform_name {
      Some(transform) => transform(&doc).unwrap_or_else(|| default_filename(&doc, &id, ext)),
      None => default_filename(&doc, &id, ext),
    };
    if options.log {
      info!("extracting '{}' -> '{}'", id, filename);
    }

    let relative_path = PathBuf::from(&filename);
    let final_doc = if options.omit_volatile {
      volatile::gate(&doc, &dest.join(&relative_path), collection)
    } else {
      doc
    };
    serializer::write_file(&staging.join(&relative_path), &final_doc, options.yaml, &options.json_options, &options.yaml_options)?;
  }

  Ok(())
}

type PathState = (Vec<String>, Vec<String>);

fn load_folder_map(store: &mut SortedStore, options: &ExtractOptions) -> AnyResult<HashMap<String, FolderEntry>> {
  if !options.folders {
    return Ok(HashMap::new());
  }
  let folder_docs: Vec<Value> = store
    .iter_all()?
    .into_iter()
    .filter(|(key, _value)| key::sublevel_of(key) == "folders")
    .map(|(_key, value)| value)
    .collect();
  let transform = options.transform_folder_name.as_deref();
  folder::build_folder_map(&folder_docs, options.expand_adventures, transform)
}

fn extract_sorted_store(src: &Path, staging: &Path, dest: &Path, options: &ExtractOptions) -> AnyResult<()> {
  let mut store = SortedStore::open(src, false).with_context(|| format!("failed to open sorted store '{}'", src.display()))?;
  let folder_map = load_folder_map(&mut store, options)?;
  let ext = file_ext(options);

  let entries = store.iter_all()?;
  for (key, mut doc) in entries {
    if key::is_embedded_key(&key) {
      continue;
    }
    let collection = key::sublevel_of(&key).to_owned();

    walker::apply(&mut doc, &collection, None, (Vec::<String>::new(), Vec::<String>::new()), &mut |
      node,
      node_collection,
      _index,
      (parent_sublevel, parent_id): PathState,
    | -> AnyResult<PathState> {
      let node_id = document::id(node).unwrap_or("").to_owned();
      let mut sublevel_parts = parent_sublevel;
      sublevel_parts.push(node_collection.to_owned());
      let mut id_parts = parent_id;
      id_parts.push(node_id);
      let node_key = key::encode(sublevel_parts.iter().map(String::as_str), id_parts.iter().map(String::as_str));
      document::set_key(node, node_key);

      walker::map_embedded(node, node_collection, |embedded_name, item| {
        let embedded_id = item
          .as_str()
          .ok_or_else(|| format_err!("expected a bare _id reference in '{}'", embedded_name))?
          .to_owned();
        let embedded_key = key::encode(
          sublevel_parts.iter().map(String::as_str).chain(std::iter::once(embedded_name)),
          id_parts.iter().map(String::as_str).chain(std::iter::once(embedded_id.as_str())),
        );
        store
          .get(&embedded_key)?
          .ok_or_else(|| format_err!("missing embedded document at key '{}'", embedded_key))
      })?;

      Ok((sublevel_parts, id_parts))
    })?;

    if let Some(transform) = &options.transform_entry {
      if !transform(&mut doc)? {
        continue;
      }
    }

    if options.log {
      info!("extracting '{}'", key);
    }

    if collection == "adventures" && options.expand_adventures {
      extract_adventure(&doc, &key, staging, dest, &folder_map, options, ext)?;
      continue;
    }

    let relative_path = derive_primary_path(&doc, &key, &collection, &folder_map, options, ext);
    let final_doc =
      if options.omit_volatile { volatile::gate(&doc, &dest.join(&relative_path), &collection) } else { doc };
    serializer::write_file(&staging.join(&relative_path), &final_doc, options.yaml, &options.json_options, &options.yaml_options)?;
  }

  store.close()
}

fn derive_primary_path(
  doc: &Value,
  key: &str,
  collection: &str,
  folder_map: &HashMap<String, FolderEntry>,
  options: &ExtractOptions,
  ext: &str,
) -> PathBuf {
  let id_hint = key::decode(key).map(|(_, id)| id).unwrap_or("");

  let filename = if let Some(transform) = &options.transform_name {
    if let Some(name) = transform(doc) {
      name
    } else {
      default_filename_for_primary(doc, id_hint, collection, folder_map, ext)
    }
  } else {
    default_filename_for_primary(doc, id_hint, collection, folder_map, ext)
  };

  let mut path = PathBuf::new();
  if options.folders {
    if let Some(folder_id) = document::folder(doc) {
      if let Some(entry) = folder_map.get(folder_id) {
        path.push(&entry.path);
      }
    }
  }
  path.push(filename);
  path
}

fn default_filename_for_primary(
  doc: &Value,
  id_hint: &str,
  collection: &str,
  folder_map: &HashMap<String, FolderEntry>,
  ext: &str,
) -> String {
  if collection == "folders" {
    if let Some(id) = document::id(doc) {
      if folder_map.contains_key(id) {
        return format!("_Folder.{}", ext);
      }
    }
  }
  default_filename(doc, id_hint, ext)
}

fn adventure_dir_name(doc: &Value, id: &str) -> String {
  match document::name(doc) {
    Some(name) if !name.is_empty() => format!("{}_{}", filename::safe_name(name), id),
    _ => id.to_owned(),
  }
}

fn extract_adventure(
  doc: &Value,
  key: &str,
  staging: &Path,
  dest: &Path,
  folder_map: &HashMap<String, FolderEntry>,
  options: &ExtractOptions,
  ext: &str,
) -> AnyResult<()> {
  let id = key::decode(key).map(|(_, id)| id).unwrap_or("").to_owned();

  // The adventure becomes a directory (with `_Adventure.<ext>` and grouped
  // `<collection>/` subfolders inside it) only in folders mode (spec §4.9);
  // otherwise its embedded subdocuments are flat siblings of a plainly-named
  // primary file, exactly like any other primary document (end-to-end
  // Scenario E).
  let mut root = PathBuf::new();
  let primary_path = if options.folders {
    if let Some(folder_id) = document::folder(doc) {
      if let Some(entry) = folder_map.get(folder_id) {
        root.push(&entry.path);
      }
    }
    root.push(adventure_dir_name(doc, &id));
    root.join(format!("_Adventure.{}", ext))
  } else {
    root.join(format!("{}.{}", adventure_dir_name(doc, &id), ext))
  };

  let mut adventure_doc = doc.clone();
  let expanded = adventure::expand(&mut adventure_doc, ext, options.folders)?;

  let final_primary = if options.omit_volatile {
    volatile::gate(&adventure_doc, &dest.join(&primary_path), "adventures")
  } else {
    adventure_doc
  };
  serializer::write_file(&staging.join(&primary_path), &final_primary, options.yaml, &options.json_options, &options.yaml_options)?;

  for file in expanded {
    let sub_path = root.join(&file.relative_path);
    let final_doc = if options.omit_volatile {
      volatile::gate(&file.document, &dest.join(&sub_path), file.collection)
    } else {
      file.document
    };
    serializer::write_file(&staging.join(&sub_path), &final_doc, options.yaml, &options.json_options, &options.yaml_options)?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile::{compile_pack, CompileOptions};
  use serde_json::json;
  use tempfile::tempdir;

  fn write_source(dir: &Path, filename: &str, doc: &Value) {
    fs::write(dir.join(filename), serde_json::to_string(doc).unwrap()).unwrap();
  }

  #[test]
  fn nedb_source_without_db_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let options = ExtractOptions { nedb: true, ..ExtractOptions::default() };
    let err = extract_pack(&dir.path().join("pack"), &dir.path().join("out"), &options).unwrap_err();
    assert!(err.downcast_ref::<PackError>().is_some());
  }

  #[test]
  fn nedb_extract_without_collection_fails_with_missing_type() {
    let dir = tempdir().unwrap();
    let pack = dir.path().join("pack.db");
    fs::write(&pack, "").unwrap();
    let options = ExtractOptions { nedb: true, ..ExtractOptions::default() };
    let err = extract_pack(&pack, &dir.path().join("out"), &options).unwrap_err();
    assert!(err.downcast_ref::<PackError>().is_some());
  }

  #[test]
  fn round_trips_sorted_store_actor_with_embedded_item() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(
      &src,
      "hero.json",
      &json!({
        "_key": "!actors!aaa",
        "_id": "aaa",
        "name": "Hero",
        "items": [{ "_id": "i1", "name": "Sword", "effects": [] }],
        "effects": [],
      }),
    );

    let pack = dir.path().join("pack");
    compile_pack(&src, &pack, &CompileOptions::default()).unwrap();

    let out = dir.path().join("out");
    extract_pack(&pack, &out, &ExtractOptions::default()).unwrap();

    let extracted = fs::read_to_string(out.join("Hero_aaa.json")).unwrap();
    let doc: Value = serde_json::from_str(&extracted).unwrap();
    assert_eq!(doc["items"][0]["name"], "Sword");
    assert_eq!(doc["_key"], "!actors!aaa");
  }

  #[test]
  fn folders_mode_nests_files_under_folder_path() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(&src, "folder.json", &json!({ "_key": "!folders!f1", "_id": "f1", "name": "Monsters", "type": "Actor" }));
    write_source(
      &src,
      "hero.json",
      &json!({ "_key": "!actors!aaa", "_id": "aaa", "name": "Hero", "folder": "f1", "items": [], "effects": [] }),
    );

    let pack = dir.path().join("pack");
    compile_pack(&src, &pack, &CompileOptions::default()).unwrap();

    let out = dir.path().join("out");
    let options = ExtractOptions { folders: true, ..ExtractOptions::default() };
    extract_pack(&pack, &out, &options).unwrap();

    assert!(out.join("Monsters_f1/Hero_aaa.json").exists());
    assert!(out.join("Monsters_f1/_Folder.json").exists());
  }

  #[test]
  fn expand_adventures_without_folders_yields_flat_siblings() {
    // End-to-end Scenario E: folders=false, expandAdventures=true.
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(
      &src,
      "adventure.json",
      &json!({
        "_key": "!adventures!adv1",
        "_id": "adv1",
        "name": "Intro",
        "items": [{ "_id": "i1", "name": "Sword" }],
      }),
    );

    let pack = dir.path().join("pack");
    compile_pack(&src, &pack, &CompileOptions::default()).unwrap();

    let out = dir.path().join("out");
    let options = ExtractOptions { expand_adventures: true, folders: false, ..ExtractOptions::default() };
    extract_pack(&pack, &out, &options).unwrap();

    assert!(out.join("Intro_adv1.json").exists());
    assert!(!out.join("Intro_adv1").exists());
    assert!(out.join("Sword_i1.json").exists());

    let adventure: Value = serde_json::from_str(&fs::read_to_string(out.join("Intro_adv1.json")).unwrap()).unwrap();
    assert_eq!(adventure["items"], json!(["Sword_i1.json"]));
    let item: Value = serde_json::from_str(&fs::read_to_string(out.join("Sword_i1.json")).unwrap()).unwrap();
    assert_eq!(item["name"], "Sword");
  }

  #[test]
  fn expand_adventures_with_folders_nests_a_directory() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(
      &src,
      "adventure.json",
      &json!({
        "_key": "!adventures!adv1",
        "_id": "adv1",
        "name": "Intro",
        "items": [{ "_id": "i1", "name": "Sword" }],
      }),
    );

    let pack = dir.path().join("pack");
    compile_pack(&src, &pack, &CompileOptions::default()).unwrap();

    let out = dir.path().join("out");
    let options = ExtractOptions { expand_adventures: true, folders: true, ..ExtractOptions::default() };
    extract_pack(&pack, &out, &options).unwrap();

    assert!(out.join("Intro_adv1/_Adventure.json").exists());
    assert!(out.join("Intro_adv1/items/Sword_i1.json").exists());

    let adventure: Value =
      serde_json::from_str(&fs::read_to_string(out.join("Intro_adv1/_Adventure.json")).unwrap()).unwrap();
    assert_eq!(adventure["items"], json!(["items/Sword_i1.json"]));
  }
}
