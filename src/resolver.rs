//! The document-type resolver (spec §4.14): stands in for the original
//! system's installed-package manifest scan, mapping a user-facing
//! document-type hint to a collection name for log-store extraction.

use crate::catalog;

pub trait DocumentTypeResolver: std::fmt::Debug {
  fn resolve(&self, document_type: &str) -> Option<String>;
}

/// Resolves purely from the fixed primary-type/collection bijection (spec
/// §3). The CLI wires this in by default; embedders with a real manifest
/// registry to query (or a config-file-backed one, see [`crate::config`]) can
/// supply their own [`DocumentTypeResolver`] instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticResolver;

impl DocumentTypeResolver for StaticResolver {
  fn resolve(&self, document_type: &str) -> Option<String> {
    catalog::collection_for_document_type(document_type).map(str::to_owned)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn static_resolver_uses_the_catalog_bijection() {
    let resolver = StaticResolver;
    assert_eq!(resolver.resolve("Actor"), Some("actors".to_owned()));
    assert_eq!(resolver.resolve("Nonexistent"), None);
  }
}
