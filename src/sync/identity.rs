//! Key mapping between the relational and document stores.
//!
//! Both stores generate their own primary keys, so the same logical entity is
//! correlated through a natural business key (the username for users). The map
//! is built fresh for every pass and never persisted.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Transient source-key → destination-key table.
#[derive(Debug, Clone)]
pub struct IdentityMap<S, D> {
    forward: HashMap<S, D>,
    skipped: Vec<S>,
}

impl<S, D> Default for IdentityMap<S, D> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            skipped: Vec::new(),
        }
    }
}

impl<S, D> IdentityMap<S, D>
where
    S: Eq + Hash + Clone + Debug,
    D: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Correlates two listings of `(natural key, native key)` pairs.
    ///
    /// The destination is scanned once into a natural-key index; a duplicate
    /// natural key there silently keeps the last one seen. Source entries with
    /// no destination match are remembered in [`skipped`](Self::skipped).
    pub fn build<K, DI, SI>(destination: DI, source: SI) -> Self
    where
        K: Eq + Hash,
        DI: IntoIterator<Item = (K, D)>,
        SI: IntoIterator<Item = (K, S)>,
    {
        let by_natural_key: HashMap<K, D> = destination.into_iter().collect();

        let mut map = Self::new();
        for (natural_key, source_key) in source {
            match by_natural_key.get(&natural_key) {
                Some(dest) => {
                    map.forward.insert(source_key, dest.clone());
                }
                None => {
                    debug!("No destination match for {:?}, skipped", source_key);
                    map.skipped.push(source_key);
                }
            }
        }

        map
    }

    /// Records an association created by the caller (e.g. a freshly inserted record).
    pub fn record(&mut self, source: S, destination: D) {
        self.forward.insert(source, destination);
    }

    #[must_use]
    pub fn resolve(&self, source: &S) -> Option<&D> {
        self.forward.get(source)
    }

    /// Resolves an optional reference, yielding `None` for both "no reference" and "no match".
    #[must_use]
    pub fn resolve_opt(&self, source: Option<&S>) -> Option<D> {
        source.and_then(|s| self.resolve(s)).cloned()
    }

    #[must_use]
    pub fn skipped(&self) -> &[S] {
        &self.skipped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
