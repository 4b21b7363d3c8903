//! The hierarchy catalog (spec §3, §4.7): a compile-time constant table
//! describing which collections own which embedded collections, and of what
//! arity. This is the single source of truth the hierarchy walker, the
//! compile/extract orchestrators, and the adventure expander all dispatch on.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  /// The embedded collection is stored as a JSON array of documents.
  Array,
  /// The embedded collection is stored as at most one document (or absent).
  Single,
}

/// `collection -> [(embedded_collection_name, arity)]`, order-preserving so
/// that walking a document's embedded slots is deterministic.
pub type CollectionEntry = &'static [(&'static str, Arity)];

static RAW_CATALOG: &[(&str, CollectionEntry)] = &[
  ("actors", &[("items", Arity::Array), ("effects", Arity::Array)]),
  ("cards", &[("cards", Arity::Array)]),
  ("combats", &[("combatants", Arity::Array), ("groups", Arity::Array)]),
  ("delta", &[("items", Arity::Array), ("effects", Arity::Array)]),
  ("items", &[("effects", Arity::Array)]),
  ("journal", &[("pages", Arity::Array), ("categories", Arity::Array)]),
  ("playlists", &[("sounds", Arity::Array)]),
  ("regions", &[("behaviors", Arity::Array)]),
  ("tables", &[("results", Arity::Array)]),
  ("tokens", &[("delta", Arity::Single)]),
  (
    "scenes",
    &[
      ("drawings", Arity::Array),
      ("tokens", Arity::Array),
      ("lights", Arity::Array),
      ("notes", Arity::Array),
      ("regions", Arity::Array),
      ("sounds", Arity::Array),
      ("templates", Arity::Array),
      ("tiles", Arity::Array),
      ("walls", Arity::Array),
    ],
  ),
];

static CATALOG_MAP: Lazy<HashMap<&'static str, CollectionEntry>> =
  Lazy::new(|| RAW_CATALOG.iter().copied().collect());

/// Embedded collections declared for `collection`, empty if `collection` has
/// none (including collections unknown to the catalog entirely).
pub fn embedded_collections_of(collection: &str) -> CollectionEntry {
  CATALOG_MAP.get(collection).copied().unwrap_or(&[])
}

pub fn is_known_root(collection: &str) -> bool {
  CATALOG_MAP.contains_key(collection)
}

/// Fixed bijection between primary document types and top-level collection
/// names (spec §3).
pub static PRIMARY_TYPE_TO_COLLECTION: &[(&str, &str)] = &[
  ("Actor", "actors"),
  ("Adventure", "adventures"),
  ("Cards", "cards"),
  ("ChatMessage", "messages"),
  ("Combat", "combats"),
  ("FogExploration", "fog"),
  ("Folder", "folders"),
  ("Item", "items"),
  ("JournalEntry", "journal"),
  ("Macro", "macros"),
  ("Playlist", "playlists"),
  ("RollTable", "tables"),
  ("Scene", "scenes"),
  ("Setting", "settings"),
  ("User", "users"),
];

pub fn collection_for_document_type(document_type: &str) -> Option<&'static str> {
  PRIMARY_TYPE_TO_COLLECTION
    .iter()
    .find(|(ty, _)| *ty == document_type)
    .map(|(_, collection)| *collection)
}

/// The fixed list of collections an Adventure document may carry inline or
/// expanded (spec §3).
pub static ADVENTURE_EMBEDDED_COLLECTIONS: &[&str] =
  &["actors", "cards", "combats", "folders", "items", "journal", "playlists", "scenes", "tables", "macros"];

/// The `_stats` sub-fields excluded from change detection in `omitVolatile`
/// mode (spec §3).
pub static VOLATILE_FIELDS: &[&str] =
  &["createdTime", "modifiedTime", "lastModifiedBy", "systemVersion", "coreVersion"];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scenes_has_nine_embedded_collections() {
    assert_eq!(embedded_collections_of("scenes").len(), 9);
  }

  #[test]
  fn tokens_delta_is_single_arity() {
    let entry = embedded_collections_of("tokens");
    assert_eq!(entry, &[("delta", Arity::Single)]);
  }

  #[test]
  fn unknown_collection_has_no_embeddeds() {
    assert!(embedded_collections_of("messages").is_empty());
    assert!(!is_known_root("messages"));
  }

  #[test]
  fn primary_type_bijection_round_trips() {
    assert_eq!(collection_for_document_type("Actor"), Some("actors"));
    assert_eq!(collection_for_document_type("RollTable"), Some("tables"));
    assert_eq!(collection_for_document_type("Nonexistent"), None);
  }
}
