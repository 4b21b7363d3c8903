/// Fails to compile if `$trait_name` isn't object-safe, by forcing a `dyn
/// $trait_name` reference into existence. Meant to be invoked right next to
/// a trait's definition, so a later accidental addition of e.g. a generic
/// method is caught at the trait's own declaration site rather than wherever
/// someone first tries to build a trait object out of it.
#[macro_export(local_inner_macros)]
macro_rules! assert_trait_is_object_safe {
  ($trait_name:ident) => {
    #[allow(dead_code)]
    fn __assert_trait_is_object_safe(_: &dyn $trait_name) {}
  };
}

#[macro_export(local_inner_macros)]
macro_rules! replace_with_single_token {
  ($($x:tt)*) => {
    ()
  };
}

#[macro_export(local_inner_macros)]
macro_rules! count_exprs {
  ($($rest:expr),*) => {
    <[()]>::len(&[$(replace_with_single_token!($rest)),*])
  };
}

// Taken from <https://github.com/bluss/maplit/blob/04936f703da907bc4ffdaced121e4cfd5ecbaec6/src/lib.rs#L77-L93>
#[macro_export(local_inner_macros)]
macro_rules! hashset {
  ($($key:expr,)+) => { hashset!($($key),+) };
  ($($key:expr),*) => {
    {
      let _cap = count_exprs!($($key),*);
      let mut _set = ::std::collections::HashSet::with_capacity(_cap);
      $(let _ = _set.insert($key);)*
      _set
    }
  };
}
