//! Ordered set of values held as wrapped nodes in external storage.
//!
//! The value-owning counterpart of [`Tree`](crate::Tree): values are wrapped
//! in a [`SetNode`] carrying the links, insertion allocates the node in
//! storage, and removal frees it and hands the value back. Ordering comes
//! from a [`Compare`] comparator over the plain value type; uniqueness is
//! under that comparator.
//!
//! # Example
//!
//! ```
//! use arbor_collections::{OrderedSet, Pool, SetInsert, SetNode};
//!
//! let mut pool: Pool<SetNode<&str>> = Pool::with_capacity(16);
//! let mut set = OrderedSet::new();
//!
//! set.try_insert(&mut pool, "checksum mismatch").unwrap();
//! set.try_insert(&mut pool, "timed out").unwrap();
//!
//! // Duplicates bounce back with the resident's key
//! match set.try_insert(&mut pool, "timed out").unwrap() {
//!     SetInsert::Rejected(resident, value) => {
//!         assert_eq!(set.get(&pool, resident), Some(&"timed out"));
//!         assert_eq!(value, "timed out");
//!     }
//!     SetInsert::Inserted(_) => unreachable!(),
//! }
//!
//! let sorted: Vec<&str> = set.iter(&pool).copied().collect();
//! assert_eq!(sorted, vec!["checksum mismatch", "timed out"]);
//! ```

use core::cmp::Ordering;
use core::marker::PhantomData;

use crate::tree::{predecessor, successor, Compare, Natural, TreeLinked};
use crate::{BoundedStorage, Full, Key, Storage, UnboundedStorage};

/// A set node wrapping a value together with its tree links.
///
/// Constructed internally by [`OrderedSet`]; callers only choose the storage
/// that holds them, e.g. `Pool<SetNode<T>>`.
#[derive(Debug)]
pub struct SetNode<T, K: Key = u32> {
    data: T,
    left: K,
    right: K,
    parent: K,
}

impl<T, K: Key> SetNode<T, K> {
    #[inline]
    fn new(data: T) -> Self {
        Self {
            data,
            left: K::NONE,
            right: K::NONE,
            parent: K::NONE,
        }
    }

    /// Returns a reference to the wrapped value.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T, K: Key> TreeLinked<K> for SetNode<T, K> {
    #[inline]
    fn left(&self) -> K {
        self.left
    }
    #[inline]
    fn right(&self) -> K {
        self.right
    }
    #[inline]
    fn parent(&self) -> K {
        self.parent
    }
    #[inline]
    fn set_left(&mut self, key: K) {
        self.left = key;
    }
    #[inline]
    fn set_right(&mut self, key: K) {
        self.right = key;
    }
    #[inline]
    fn set_parent(&mut self, key: K) {
        self.parent = key;
    }
}

/// Outcome of a set insertion.
#[derive(Debug, PartialEq, Eq)]
pub enum SetInsert<K, T> {
    /// The value went in; its new node key.
    Inserted(K),
    /// An equal value was already resident: its key, and the rejected value
    /// handed back untouched.
    Rejected(K, T),
}

impl<K: Key, T> SetInsert<K, T> {
    /// The key now holding a value equal to the one passed in, whether it
    /// was freshly inserted or already resident.
    #[inline]
    pub fn key(&self) -> K {
        match self {
            SetInsert::Inserted(key) => *key,
            SetInsert::Rejected(key, _) => *key,
        }
    }

    /// Returns `true` if the value was inserted.
    #[inline]
    pub fn is_inserted(&self) -> bool {
        matches!(self, SetInsert::Inserted(_))
    }
}

/// An ordered set of values held in external storage.
///
/// Search, insert, and remove walk an unbalanced binary search tree of
/// [`SetNode`]s: O(log n) on average, O(n) after adversarial insertion
/// orders. See the [module docs](self) for an example.
#[derive(Debug)]
pub struct OrderedSet<T, K: Key = u32, C = Natural> {
    root: K,
    len: usize,
    cmp: C,
    _marker: PhantomData<T>,
}

impl<T: Ord, K: Key> OrderedSet<T, K, Natural> {
    /// Creates an empty set ordered by `T: Ord`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            root: K::NONE,
            len: 0,
            cmp: Natural,
            _marker: PhantomData,
        }
    }
}

impl<T: Ord, K: Key> Default for OrderedSet<T, K, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Key, C: Compare<T>> OrderedSet<T, K, C> {
    /// Creates an empty set bound to the given comparator.
    #[inline]
    pub const fn with_comparator(cmp: C) -> Self {
        Self {
            root: K::NONE,
            len: 0,
            cmp,
            _marker: PhantomData,
        }
    }

    /// Returns the number of values in the set.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a value, failing only when storage is full.
    ///
    /// A duplicate is not an error: the value comes back in
    /// [`SetInsert::Rejected`] along with the resident's key, and no storage
    /// slot is consumed.
    pub fn try_insert<S>(&mut self, storage: &mut S, value: T) -> Result<SetInsert<K, T>, Full<T>>
    where
        S: BoundedStorage<SetNode<T, K>, Key = K>,
    {
        match self.locate(storage, &value) {
            Location::Resident(key) => Ok(SetInsert::Rejected(key, value)),
            Location::Vacant(parent, side) => {
                let key = storage
                    .try_insert(SetNode::new(value))
                    .map_err(|e| Full(e.0.data))?;
                self.attach(storage, key, parent, side);
                Ok(SetInsert::Inserted(key))
            }
        }
    }

    /// Inserts a value into growable storage.
    pub fn insert<S>(&mut self, storage: &mut S, value: T) -> SetInsert<K, T>
    where
        S: UnboundedStorage<SetNode<T, K>, Key = K>,
    {
        match self.locate(storage, &value) {
            Location::Resident(key) => SetInsert::Rejected(key, value),
            Location::Vacant(parent, side) => {
                let key = storage.insert(SetNode::new(value));
                self.attach(storage, key, parent, side);
                SetInsert::Inserted(key)
            }
        }
    }

    /// Finds the node whose value compares equal to `probe`.
    pub fn find<S>(&self, storage: &S, probe: &T) -> Option<K>
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        match self.locate(storage, probe) {
            Location::Resident(key) => Some(key),
            Location::Vacant(..) => None,
        }
    }

    /// Returns `true` if a value compares equal to `probe`.
    #[inline]
    pub fn contains<S>(&self, storage: &S, probe: &T) -> bool
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        self.find(storage, probe).is_some()
    }

    /// Returns a reference to the value at `key`.
    #[inline]
    pub fn get<'a, S>(&self, storage: &'a S, key: K) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
        S: Storage<SetNode<T, K>, Key = K>,
    {
        storage.get(key).map(|node| &node.data)
    }

    /// Removes the value comparing equal to `probe`, freeing its node.
    ///
    /// Returns `None` if no value matches.
    pub fn remove<S>(&mut self, storage: &mut S, probe: &T) -> Option<T>
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        let key = self.find(storage, probe)?;
        self.detach(storage, key);
        self.len -= 1;
        // Safety: key was linked, so it is occupied
        let node = unsafe { storage.remove_unchecked(key) };
        Some(node.data)
    }

    /// Returns a reference to the smallest value.
    #[inline]
    pub fn first<'a, S>(&self, storage: &'a S) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
        S: Storage<SetNode<T, K>, Key = K>,
    {
        if self.root.is_none() {
            return None;
        }
        let key = self.leftmost(storage, self.root);
        // Safety: tree nodes are occupied
        Some(unsafe { &storage.get_unchecked(key).data })
    }

    /// Returns a reference to the largest value.
    #[inline]
    pub fn last<'a, S>(&self, storage: &'a S) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
        S: Storage<SetNode<T, K>, Key = K>,
    {
        let mut cur = self.root;
        if cur.is_none() {
            return None;
        }
        // Safety: tree nodes are occupied
        loop {
            let node = unsafe { storage.get_unchecked(cur) };
            if node.right.is_none() {
                return Some(&node.data);
            }
            cur = node.right;
        }
    }

    /// Removes every value, freeing all nodes.
    ///
    /// Post-order walk via parent links; no auxiliary stack.
    pub fn clear<S>(&mut self, storage: &mut S)
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        let mut cur = self.root;
        while cur.is_some() {
            // Safety: cur is a linked node
            let node = unsafe { storage.get_unchecked(cur) };
            if node.left.is_some() {
                cur = node.left;
                continue;
            }
            if node.right.is_some() {
                cur = node.right;
                continue;
            }

            let parent = node.parent;
            // Safety: cur is a leaf of the remaining tree, occupied
            unsafe { storage.remove_unchecked(cur) };
            if parent.is_some() {
                let pnode = unsafe { storage.get_unchecked_mut(parent) };
                if pnode.left == cur {
                    pnode.left = K::NONE;
                } else {
                    pnode.right = K::NONE;
                }
            }
            cur = parent;
        }

        self.root = K::NONE;
        self.len = 0;
    }

    /// Returns an iterator over value references in ascending order.
    #[inline]
    pub fn iter<'a, S>(&self, storage: &'a S) -> Iter<'a, T, S, K>
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        let first = if self.root.is_none() {
            K::NONE
        } else {
            self.leftmost(storage, self.root)
        };
        Iter {
            storage,
            next: first,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over value references in descending order.
    #[inline]
    pub fn iter_rev<'a, S>(&self, storage: &'a S) -> IterRev<'a, T, S, K>
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        let mut last = self.root;
        if last.is_some() {
            // Safety: tree nodes are occupied
            loop {
                let right = unsafe { storage.get_unchecked(last) }.right;
                if right.is_none() {
                    break;
                }
                last = right;
            }
        }
        IterRev {
            storage,
            next: last,
            _marker: PhantomData,
        }
    }

    /// Walks the tree for `probe`, returning where it is or would go.
    fn locate<S>(&self, storage: &S, probe: &T) -> Location<K>
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        if self.root.is_none() {
            return Location::Vacant(K::NONE, Side::Left);
        }

        let mut cur = self.root;
        loop {
            // Safety: cur is a linked node
            let node = unsafe { storage.get_unchecked(cur) };
            match self.cmp.compare(probe, &node.data) {
                Ordering::Equal => return Location::Resident(cur),
                Ordering::Less => {
                    if node.left.is_none() {
                        return Location::Vacant(cur, Side::Left);
                    }
                    cur = node.left;
                }
                Ordering::Greater => {
                    if node.right.is_none() {
                        return Location::Vacant(cur, Side::Right);
                    }
                    cur = node.right;
                }
            }
        }
    }

    /// Links a freshly allocated node under `parent`, or as the root.
    fn attach<S>(&mut self, storage: &mut S, key: K, parent: K, side: Side)
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        if parent.is_none() {
            self.root = key;
        } else {
            // Safety: key was just inserted, parent is a linked node
            unsafe { storage.get_unchecked_mut(key) }.parent = parent;
            let pnode = unsafe { storage.get_unchecked_mut(parent) };
            match side {
                Side::Left => pnode.left = key,
                Side::Right => pnode.right = key,
            }
        }
        self.len += 1;
    }

    /// Splices `target` out of the tree, rewiring parent and children.
    fn detach<S>(&mut self, storage: &mut S, target: K)
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        // Safety throughout: all keys handled here come from links of linked
        // nodes, which the tree invariant keeps occupied.
        let (left, right, parent) = {
            let node = unsafe { storage.get_unchecked(target) };
            (node.left, node.right, node.parent)
        };

        let replacement = if left.is_none() {
            if right.is_some() {
                unsafe { storage.get_unchecked_mut(right) }.parent = parent;
            }
            right
        } else if right.is_none() {
            unsafe { storage.get_unchecked_mut(left) }.parent = parent;
            left
        } else {
            // Two children: promote the in-order successor
            let succ = self.leftmost(storage, right);

            if succ != right {
                let (succ_parent, succ_right) = {
                    let snode = unsafe { storage.get_unchecked(succ) };
                    (snode.parent, snode.right)
                };
                unsafe { storage.get_unchecked_mut(succ_parent) }.left = succ_right;
                if succ_right.is_some() {
                    unsafe { storage.get_unchecked_mut(succ_right) }.parent = succ_parent;
                }
                unsafe { storage.get_unchecked_mut(succ) }.right = right;
                unsafe { storage.get_unchecked_mut(right) }.parent = succ;
            }

            {
                let snode = unsafe { storage.get_unchecked_mut(succ) };
                snode.left = left;
                snode.parent = parent;
            }
            unsafe { storage.get_unchecked_mut(left) }.parent = succ;
            succ
        };

        if parent.is_none() {
            self.root = replacement;
        } else {
            let pnode = unsafe { storage.get_unchecked_mut(parent) };
            if pnode.left == target {
                pnode.left = replacement;
            } else {
                pnode.right = replacement;
            }
        }
    }

    #[inline]
    fn leftmost<S>(&self, storage: &S, mut key: K) -> K
    where
        S: Storage<SetNode<T, K>, Key = K>,
    {
        // Safety: callers pass a linked node
        loop {
            let left = unsafe { storage.get_unchecked(key) }.left;
            if left.is_none() {
                return key;
            }
            key = left;
        }
    }
}

/// Ascending iterator over an [`OrderedSet`]'s values.
pub struct Iter<'a, T, S, K: Key> {
    storage: &'a S,
    next: K,
    _marker: PhantomData<T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for Iter<'a, T, S, K>
where
    S: Storage<SetNode<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        // Safety: next is a linked node
        let node = unsafe { self.storage.get_unchecked(self.next) };
        self.next = successor(self.storage, self.next);
        Some(&node.data)
    }
}

/// Descending iterator over an [`OrderedSet`]'s values.
pub struct IterRev<'a, T, S, K: Key> {
    storage: &'a S,
    next: K,
    _marker: PhantomData<T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for IterRev<'a, T, S, K>
where
    S: Storage<SetNode<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        // Safety: next is a linked node
        let node = unsafe { self.storage.get_unchecked(self.next) };
        self.next = predecessor(self.storage, self.next);
        Some(&node.data)
    }
}

enum Location<K> {
    Resident(K),
    Vacant(K, Side),
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pool;

    fn pool(capacity: usize) -> Pool<SetNode<i64>> {
        Pool::with_capacity(capacity)
    }

    fn collect(pool: &Pool<SetNode<i64>>, set: &OrderedSet<i64>) -> Vec<i64> {
        set.iter(pool).copied().collect()
    }

    #[test]
    fn empty_set() {
        let storage = pool(4);
        let set: OrderedSet<i64> = OrderedSet::new();

        assert!(set.is_empty());
        assert!(set.find(&storage, &1).is_none());
        assert!(set.first(&storage).is_none());
        assert!(set.last(&storage).is_none());
        assert!(set.iter(&storage).next().is_none());
    }

    #[test]
    fn insert_and_iterate_sorted() {
        let mut storage = pool(8);
        let mut set = OrderedSet::new();

        for v in [5i64, 3, 8, 1] {
            assert!(set.try_insert(&mut storage, v).unwrap().is_inserted());
        }

        assert_eq!(set.len(), 4);
        assert_eq!(collect(&storage, &set), vec![1, 3, 5, 8]);

        let descending: Vec<i64> = set.iter_rev(&storage).copied().collect();
        assert_eq!(descending, vec![8, 5, 3, 1]);
    }

    #[test]
    fn duplicate_bounces_back_with_resident_key() {
        let mut storage = pool(8);
        let mut set = OrderedSet::new();

        let outcome = set.try_insert(&mut storage, 3i64).unwrap();
        assert!(outcome.is_inserted());
        let first = outcome.key();

        let outcome = set.try_insert(&mut storage, 3i64).unwrap();
        // key() names the resident either way
        assert_eq!(outcome.key(), first);
        match outcome {
            SetInsert::Rejected(resident, value) => {
                assert_eq!(resident, first);
                assert_eq!(value, 3);
            }
            SetInsert::Inserted(_) => unreachable!(),
        }

        // No storage slot was consumed for the duplicate
        assert_eq!(storage.len(), 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_returns_the_value_and_frees_the_node() {
        let mut storage = pool(8);
        let mut set = OrderedSet::new();

        for v in [5i64, 3, 8, 1] {
            set.try_insert(&mut storage, v).unwrap();
        }

        assert_eq!(set.remove(&mut storage, &8), Some(8));
        assert_eq!(set.len(), 3);
        assert_eq!(storage.len(), 3);
        assert_eq!(collect(&storage, &set), vec![1, 3, 5]);

        assert_eq!(set.remove(&mut storage, &8), None);
    }

    #[test]
    fn remove_root_with_two_children() {
        let mut storage = pool(8);
        let mut set = OrderedSet::new();

        for v in [5i64, 2, 8, 6, 9] {
            set.try_insert(&mut storage, v).unwrap();
        }

        assert_eq!(set.remove(&mut storage, &5), Some(5));
        assert_eq!(collect(&storage, &set), vec![2, 6, 8, 9]);
    }

    #[test]
    fn remove_non_root_two_child_value_with_successor_right_subtree() {
        // Mirror of the tree-side shape: removing 20 promotes 22, and 22's
        // former right child 25 moves under 30
        let mut storage = pool(16);
        let mut set = OrderedSet::new();

        for v in [10i64, 20, 15, 30, 22, 40, 25] {
            set.try_insert(&mut storage, v).unwrap();
        }

        assert_eq!(set.remove(&mut storage, &20), Some(20));
        assert_eq!(set.len(), 6);
        assert_eq!(storage.len(), 6);
        assert_eq!(collect(&storage, &set), vec![10, 15, 22, 25, 30, 40]);

        // Every survivor is still findable and removable
        for v in [10i64, 15, 22, 25, 30, 40] {
            assert!(set.contains(&storage, &v));
        }
        for v in [22i64, 30, 25, 10, 40, 15] {
            assert_eq!(set.remove(&mut storage, &v), Some(v));
        }
        assert!(set.is_empty());
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn full_storage_hands_the_value_back() {
        let mut storage = pool(2);
        let mut set = OrderedSet::new();

        set.try_insert(&mut storage, 1i64).unwrap();
        set.try_insert(&mut storage, 2i64).unwrap();

        let err = set.try_insert(&mut storage, 3i64).unwrap_err();
        assert_eq!(err.into_inner(), 3);
        assert_eq!(set.len(), 2);

        // A duplicate of a resident value is rejected, not Full, even when
        // the storage has no free slot
        match set.try_insert(&mut storage, 1i64) {
            Ok(SetInsert::Rejected(_, value)) => assert_eq!(value, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn first_and_last() {
        let mut storage = pool(8);
        let mut set = OrderedSet::new();

        for v in [5i64, 3, 8, 1, 9] {
            set.try_insert(&mut storage, v).unwrap();
        }

        assert_eq!(set.first(&storage), Some(&1));
        assert_eq!(set.last(&storage), Some(&9));
    }

    #[test]
    fn clear_frees_all_nodes() {
        let mut storage = pool(16);
        let mut set = OrderedSet::new();

        for v in [5i64, 3, 8, 1, 4, 7, 9] {
            set.try_insert(&mut storage, v).unwrap();
        }

        set.clear(&mut storage);
        assert!(set.is_empty());
        assert_eq!(storage.len(), 0);

        // Fully reusable afterwards
        set.try_insert(&mut storage, 42i64).unwrap();
        assert_eq!(collect(&storage, &set), vec![42]);
    }

    #[test]
    fn comparator_controls_ordering_and_equality() {
        // Case-insensitive string set: "Error" and "ERROR" are one entry
        let mut storage: Pool<SetNode<String>> = Pool::with_capacity(8);
        let mut set = OrderedSet::with_comparator(|a: &String, b: &String| {
            a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
        });

        assert!(set
            .try_insert(&mut storage, "Error".to_string())
            .unwrap()
            .is_inserted());
        assert!(!set
            .try_insert(&mut storage, "ERROR".to_string())
            .unwrap()
            .is_inserted());
        set.try_insert(&mut storage, "abort".to_string()).unwrap();

        let entries: Vec<&String> = set.iter(&storage).collect();
        assert_eq!(entries, vec!["abort", "Error"]);

        assert_eq!(set.remove(&mut storage, &"eRrOr".to_string()).unwrap(), "Error");
    }

    #[cfg(feature = "slab")]
    #[test]
    fn grows_with_slab_storage() {
        let mut storage: slab::Slab<SetNode<i64, usize>> = slab::Slab::new();
        let mut set: OrderedSet<i64, usize> = OrderedSet::new();

        for v in (0..100i64).rev() {
            set.insert(&mut storage, v);
        }
        assert_eq!(set.len(), 100);
        assert_eq!(set.first(&storage), Some(&0));
        assert_eq!(set.last(&storage), Some(&99));
    }
}
