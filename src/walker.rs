//! The hierarchy walker (spec §4.7): a generic recursive apply/map over the
//! embedded-collection tree described by the [`catalog`](crate::catalog).
//!
//! The reference implementation draws `apply` and `apply_sync` as separate
//! (async vs. sync) entry points; per the redesign notes in spec §9 this
//! crate collapses them into one synchronous `apply`, since every I/O this
//! walker performs (embedded-reference resolution against the sorted store)
//! is done serially in array order here rather than fanned out.

use crate::catalog::{self, Arity};
use crate::impl_prelude::*;

use serde_json::Value;

/// Depth-first pre-order walk over `doc`'s embedded-collection tree.
///
/// `f` is invoked on `doc` itself first, receiving the current node, its
/// collection name, its index within its parent array (`None` for the
/// primary document, `Some(-1)` for a single-arity embedded slot, `Some(i)`
/// for the `i`th element of an array-arity slot), and the options inherited
/// from the parent call. Its return value becomes the inherited options for
/// the recursive calls into `doc`'s own embedded children.
///
/// `f` is free to mutate `doc`, including its embedded-collection fields —
/// the walker reads those fields *after* `f` returns, so replacing a slot's
/// contents (e.g. swapping an embedded document for a bare reference, or
/// vice versa) is reflected in what gets walked next. A compile-direction
/// caller that wants to keep walking the *original* subdocuments after
/// storing a transformed clone should perform that transform on a clone
/// inside `f`, leaving `doc` itself untouched.
pub fn apply<'a, T, F>(doc: &mut Value, collection: &'a str, index: Option<i64>, inherited: T, f: &mut F) -> AnyResult<()>
where
  T: Clone,
  F: FnMut(&mut Value, &'a str, Option<i64>, T) -> AnyResult<T>,
{
  let next = f(doc, collection, index, inherited)?;

  let embeds = catalog::embedded_collections_of(collection);
  let obj = match doc.as_object_mut() {
    Some(obj) => obj,
    None => return Ok(()),
  };
  for (name, arity) in embeds {
    match arity {
      Arity::Array => {
        if let Some(Value::Array(items)) = obj.get_mut(*name) {
          for (i, item) in items.iter_mut().enumerate() {
            apply(item, name, Some(i as i64), next.clone(), f)?;
          }
        }
      }
      Arity::Single => {
        if let Some(item) = obj.get_mut(*name) {
          if !item.is_null() {
            apply(item, name, Some(-1), next.clone(), f)?;
          }
        }
      }
    }
  }
  Ok(())
}

/// For each embedded-collection slot declared for `collection`, replaces its
/// contents by applying `f` to each array element (array arity) or to the
/// single value (single arity). A missing slot is treated as an empty array
/// (array arity) or `null` (single arity) — `f` is not called for it.
/// `f` receives the embedded-collection name and the slot's current element
/// value, and returns its replacement; this is the single point that
/// performs either direction of embedded-reference encoding (spec §9).
pub fn map_embedded<F>(doc: &mut Value, collection: &str, mut f: F) -> AnyResult<()>
where
  F: FnMut(&str, Value) -> AnyResult<Value>,
{
  let embeds = catalog::embedded_collections_of(collection);
  let obj = match doc.as_object_mut() {
    Some(obj) => obj,
    None => return Ok(()),
  };
  for (name, arity) in embeds {
    match arity {
      Arity::Array => {
        let slot = obj.remove(*name);
        let replaced = match slot {
          Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
              out.push(f(name, item)?);
            }
            Value::Array(out)
          }
          _ => Value::Array(Vec::new()),
        };
        obj.insert((*name).to_owned(), replaced);
      }
      Arity::Single => {
        let slot = obj.remove(*name);
        let replaced = match slot {
          Some(value) if !value.is_null() => f(name, value)?,
          _ => Value::Null,
        };
        obj.insert((*name).to_owned(), replaced);
      }
    }
  }
  Ok(())
}
