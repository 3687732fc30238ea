use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::codec::types::Atom;

/// Default entry limit, matching Erlang's default atom table size.
pub const DEFAULT_ATOM_LIMIT: usize = 1_048_576;

static GLOBAL_ATOM_TABLE: OnceLock<Arc<AtomTable>> = OnceLock::new();

/// Thread-safe interning of atom text.
///
/// Decoders that share a table hand out atoms backed by the same allocation
/// for equal text, so repeated keys in a message stream stop allocating.
/// Lookups take a read lock; only the first sighting of a name takes the write
/// lock. Once `limit` names are stored, further names are returned
/// un-interned: interning only ever saves memory, it never changes a result.
#[derive(Debug)]
pub struct AtomTable {
    atoms: RwLock<HashSet<Arc<str>>>,
    limit: usize,
    limit_reported: AtomicBool,
}

impl Default for AtomTable {
    fn default() -> Self {
        AtomTable::with_limit(DEFAULT_ATOM_LIMIT)
    }
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        AtomTable {
            atoms: RwLock::new(HashSet::new()),
            limit,
            limit_reported: AtomicBool::new(false),
        }
    }

    /// The process-wide table.
    pub fn global() -> Arc<AtomTable> {
        GLOBAL_ATOM_TABLE.get_or_init(|| Arc::new(AtomTable::new())).clone()
    }

    /// Returns the shared atom for `text`, inserting it on first sight.
    ///
    /// The caller is responsible for the atom length invariant; the decoder
    /// checks it before interning.
    pub(crate) fn intern(&self, text: &str) -> Atom {
        // A poisoned lock still guards a consistent set: inserts are single calls.
        if let Some(existing) = self.atoms.read().unwrap_or_else(PoisonError::into_inner).get(text) {
            return Atom::from_shared(existing.clone());
        }

        let mut atoms = self.atoms.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = atoms.get(text) {
            return Atom::from_shared(existing.clone());
        }
        if atoms.len() >= self.limit {
            if !self.limit_reported.swap(true, Ordering::Relaxed) {
                debug!(limit = self.limit, "atom table full, further atoms are not interned");
            }
            return Atom::from_shared(Arc::from(text));
        }
        let shared: Arc<str> = Arc::from(text);
        atoms.insert(shared.clone());
        Atom::from_shared(shared)
    }

    /// Interns `atom`'s text and returns the shared copy.
    pub fn intern_atom(&self, atom: &Atom) -> Atom {
        self.intern(atom.as_str())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.atoms.read().unwrap_or_else(PoisonError::into_inner).contains(text)
    }

    pub fn len(&self) -> usize {
        self.atoms.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_intern_shares_storage() {
        let table = AtomTable::new();
        let first = table.intern("guild_create");
        let second = table.intern("guild_create");
        assert_eq!(first, second);
        assert!(first.ptr_eq(&second));
        assert_eq!(table.len(), 1);
        assert!(table.contains("guild_create"));
        assert!(!table.contains("ready"));
    }

    #[test]
    fn test_limit_returns_uninterned_atoms() {
        let table = AtomTable::with_limit(1);
        let kept = table.intern("a");
        let overflow = table.intern("b");
        let overflow_again = table.intern("b");
        assert_eq!(table.len(), 1);
        assert_eq!(overflow, overflow_again);
        assert!(!overflow.ptr_eq(&overflow_again));
        assert!(kept.ptr_eq(&table.intern("a")));
    }

    #[test]
    fn test_concurrent_interning() {
        let table = Arc::new(AtomTable::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || (0..100).map(|i| table.intern(&format!("atom_{}", i))).collect::<Vec<_>>())
            })
            .collect();
        let results: Vec<Vec<Atom>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(table.len(), 100);
        for atoms in &results[1..] {
            for (a, b) in atoms.iter().zip(&results[0]) {
                assert!(a.ptr_eq(b));
            }
        }
    }

    #[test]
    fn test_global_table_is_singleton() {
        assert!(Arc::ptr_eq(&AtomTable::global(), &AtomTable::global()));
    }
}
