//! Keyed enter/update/exit reconciliation of rendered elements.
//!
//! Each layer keeps its drawable elements in a [`KeyedGroup`]. On every
//! redraw the incoming data is matched against the existing elements by key:
//! new keys create an element, known keys update theirs in place, and keys
//! that are no longer present have their element removed.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Identity of a rendered element, assigned when it is first created.
///
/// Stays the same for as long as the element's key keeps appearing in the
/// data, so hover state and other per-element state survive redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// A rendered element together with its key and identity.
#[derive(Debug, Clone)]
pub struct Keyed<K, E> {
    pub key: K,
    pub id: ElementId,
    pub element: E,
}

/// Ordered collection of elements keyed by `K`.
///
/// Iteration follows the order of the data passed to the last
/// [`KeyedGroup::reconcile`], which is also the paint order.
#[derive(Debug, Clone)]
pub struct KeyedGroup<K, E> {
    entries: Vec<Keyed<K, E>>,
    index: HashMap<K, usize>,
    next_id: u64,
}

impl<K, E> Default for KeyedGroup<K, E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<K: Eq + Hash + Clone + std::fmt::Debug, E> KeyedGroup<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the group against `data`.
    ///
    /// `create` builds the element for a key seen for the first time;
    /// `update` then runs for every element present in `data`, new or old.
    /// Elements whose key is absent from `data` are dropped. A key repeated
    /// within `data` keeps its first occurrence.
    pub fn reconcile<D>(
        &mut self,
        data: impl IntoIterator<Item = D>,
        key: impl Fn(&D) -> K,
        mut create: impl FnMut(&D) -> E,
        mut update: impl FnMut(&D, &mut E),
    ) -> ReconcileStats {
        let mut previous: HashMap<K, (ElementId, E)> = self
            .entries
            .drain(..)
            .map(|entry| (entry.key, (entry.id, entry.element)))
            .collect();
        self.index.clear();

        let mut stats = ReconcileStats::default();

        for datum in data {
            let k = key(&datum);
            if self.index.contains_key(&k) {
                log::warn!("Duplicate element key {:?} in render data, ignoring", k);
                continue;
            }

            let (id, mut element) = match previous.remove(&k) {
                Some(existing) => {
                    stats.updated += 1;
                    existing
                }
                None => {
                    stats.entered += 1;
                    let id = ElementId(self.next_id);
                    self.next_id += 1;
                    (id, create(&datum))
                }
            };
            update(&datum, &mut element);

            self.index.insert(k.clone(), self.entries.len());
            self.entries.push(Keyed {
                key: k,
                id,
                element,
            });
        }

        stats.exited = previous.len();
        stats
    }

    /// Removes elements whose key fails `keep`, returning how many exited.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| keep(&entry.key));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.key.clone(), i))
            .collect();
        before - self.entries.len()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Keyed<K, E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut Keyed<K, E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Keyed<K, E>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every element. Used on disposal.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(group: &mut KeyedGroup<&'static str, i32>, data: &[(&'static str, i32)]) -> ReconcileStats {
        group.reconcile(data.iter().copied(), |d| d.0, |_| 0, |d, e| *e = d.1)
    }

    #[test]
    fn test_enter_update_exit_counts() {
        let mut group = KeyedGroup::new();

        let stats = run(&mut group, &[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(
            stats,
            ReconcileStats {
                entered: 3,
                updated: 0,
                exited: 0
            }
        );

        let stats = run(&mut group, &[("a", 10), ("c", 30), ("d", 40)]);
        assert_eq!(
            stats,
            ReconcileStats {
                entered: 1,
                updated: 2,
                exited: 1
            }
        );

        let keys: Vec<_> = group.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
        assert_eq!(group.get(&"c").unwrap().element, 30);
        assert!(group.get(&"b").is_none());
    }

    #[test]
    fn test_ids_survive_updates() {
        let mut group = KeyedGroup::new();
        run(&mut group, &[("a", 1), ("b", 2)]);
        let id_b = group.get(&"b").unwrap().id;

        run(&mut group, &[("b", 5)]);
        assert_eq!(group.get(&"b").unwrap().id, id_b);

        // A key that left and came back is a new element
        run(&mut group, &[("a", 1), ("b", 5)]);
        let id_a = group.get(&"a").unwrap().id;
        assert!(id_a > id_b);
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let mut group = KeyedGroup::new();
        let stats = run(&mut group, &[("a", 1), ("a", 2)]);
        assert_eq!(stats.entered, 1);
        assert_eq!(group.len(), 1);
        assert_eq!(group.get(&"a").unwrap().element, 1);
    }

    #[test]
    fn test_retain_reindexes() {
        let mut group = KeyedGroup::new();
        run(&mut group, &[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(group.retain(|k| *k != "a"), 1);
        assert_eq!(group.get(&"c").unwrap().element, 3);
        assert!(group.get(&"a").is_none());
    }

    #[test]
    fn test_empty_data_exits_everything() {
        let mut group = KeyedGroup::new();
        run(&mut group, &[("a", 1), ("b", 2)]);
        let stats = run(&mut group, &[]);
        assert_eq!(stats.exited, 2);
        assert!(group.is_empty());
    }
}
