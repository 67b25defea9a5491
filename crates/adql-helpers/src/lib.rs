use std::hash::BuildHasherDefault;

/// Insertion-order-preserving map keyed with a fast, non-cryptographic hasher.
///
/// Metadata collections (schema tables, table columns) must preserve
/// insertion order so `SELECT *` expansion is deterministic.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<ahash::AHasher>>;
pub type IndexSet<V> = indexmap::IndexSet<V, BuildHasherDefault<ahash::AHasher>>;

/// Lets any `Sized` type be built with a closure instead of a field-by-field
/// struct literal, e.g. `Foo::default().config(|f| f.bar = 1)`.
pub trait Config: Sized {
    fn config(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

impl<T> Config for T {}
