//! Memoized observations of occ state.
//!
//! Several predicates are evaluated during one reconciliation (installed?
//! enabled? present? current value?). The cache makes sure occ is queried
//! once for all of them, and again only after a mutation invalidated it.

/// Holder for one observation, owned by the resource that uses it.
#[derive(Debug)]
pub struct ObservationCache<T> {
    value: Option<T>,
    fetches: usize,
}

impl<T> ObservationCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            value: None,
            fetches: 0,
        }
    }

    /// Return the cached observation, running `query` only when empty.
    ///
    /// A failed query leaves the cache empty.
    pub fn fetch<E>(&mut self, query: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        let value = match self.value.take() {
            Some(value) => value,
            None => {
                let value = query()?;
                self.fetches += 1;
                value
            }
        };
        Ok(self.value.insert(value))
    }

    /// Drop the cached observation; the next fetch re-queries.
    pub fn invalidate(&mut self) {
        if self.value.take().is_some() {
            log::trace!("Observation cache invalidated");
        }
    }

    /// Whether an observation is currently cached.
    pub fn is_cached(&self) -> bool {
        self.value.is_some()
    }

    /// Number of queries that populated the cache.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }
}

impl<T> Default for ObservationCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
