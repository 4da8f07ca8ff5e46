use fnv::FnvHashSet;
use std::hash::Hash;

/// A set of identifiers that remembers the order they were first inserted.
///
/// Inserting an id that is already present is a no-op, so `len` is the number
/// of distinct ids ever added (until `clear`).
#[derive(Debug, Clone)]
pub struct IdSet<T> {
    order: Vec<T>,
    members: FnvHashSet<T>,
}

impl<T> Default for IdSet<T> {
    fn default() -> Self {
        IdSet {
            order: Vec::new(),
            members: FnvHashSet::default(),
        }
    }
}

impl<T: Copy + Eq + Hash> IdSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was not present before.
    pub fn insert(&mut self, id: T) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &T) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.order
    }
}

impl<T: Copy + Eq + Hash> FromIterator<T> for IdSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = IdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a IdSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
