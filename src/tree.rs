//! Intrusive binary search tree ordered by a caller-supplied comparator.
//!
//! Host types embed left/right/parent keys via the [`TreeLinked`] trait; the
//! tree stores only the root key, a count, and the comparator. Keys are
//! unique under the comparator: inserting a node that compares equal to a
//! resident node is a no-op that hands back the resident's key.
//!
//! The tree is **not** self-balancing. Search, insert, and remove are
//! O(depth): O(log n) on average for random insertion orders, O(n) in the
//! worst case (e.g. sorted insertion). Callers that need a bounded depth
//! should randomize insertion order or pick another structure.
//!
//! ```text
//!            ┌── 5 ──┐
//!            3       8
//!          ┌─┘
//!          1
//! ```
//!
//! # Example
//!
//! ```
//! use arbor_collections::{BoundedStorage, Key, Pool, Tree, TreeLinked};
//!
//! #[derive(Debug)]
//! struct Session {
//!     id: u64,
//!     left: u32,
//!     right: u32,
//!     parent: u32,
//! }
//!
//! impl Session {
//!     fn new(id: u64) -> Self {
//!         Self { id, left: u32::NONE, right: u32::NONE, parent: u32::NONE }
//!     }
//! }
//!
//! impl TreeLinked<u32> for Session {
//!     fn left(&self) -> u32 { self.left }
//!     fn right(&self) -> u32 { self.right }
//!     fn parent(&self) -> u32 { self.parent }
//!     fn set_left(&mut self, key: u32) { self.left = key; }
//!     fn set_right(&mut self, key: u32) { self.right = key; }
//!     fn set_parent(&mut self, key: u32) { self.parent = key; }
//! }
//!
//! let mut pool: Pool<Session> = Pool::with_capacity(100);
//! let mut tree = Tree::with_comparator(|a: &Session, b: &Session| a.id.cmp(&b.id));
//!
//! let k5 = pool.try_insert(Session::new(5)).unwrap();
//! let k3 = pool.try_insert(Session::new(3)).unwrap();
//!
//! assert_eq!(tree.insert(&mut pool, k5), k5);
//! assert_eq!(tree.insert(&mut pool, k3), k3);
//!
//! // A duplicate is rejected; the resident key comes back
//! let dup = pool.try_insert(Session::new(5)).unwrap();
//! assert_eq!(tree.insert(&mut pool, dup), k5);
//! assert_eq!(tree.len(), 2);
//! ```

use core::cmp::Ordering;

use crate::{Key, Storage};

/// Three-way comparator over host objects.
///
/// The comparator is the sole source of ordering truth: the tree never
/// inspects object fields itself. It must be consistent (a total order) for
/// the lifetime of the structure.
///
/// Any `Fn(&T, &T) -> Ordering` closure is a comparator; [`Natural`] uses
/// `T: Ord`.
pub trait Compare<T> {
    /// Compares `a` against `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Zero-sized comparator using the type's `Ord` implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Natural;

impl<T: Ord> Compare<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Trait for types that can participate in a binary search tree.
///
/// Implementors embed left/right/parent keys directly in their struct, one
/// set per tree membership. The parent key keeps in-order traversal and
/// removal free of auxiliary stacks.
pub trait TreeLinked<K: Key> {
    /// Returns the left child's key, or `K::NONE`.
    fn left(&self) -> K;

    /// Returns the right child's key, or `K::NONE`.
    fn right(&self) -> K;

    /// Returns the parent's key, or `K::NONE` at the root.
    fn parent(&self) -> K;

    /// Sets the left child's key.
    fn set_left(&mut self, key: K);

    /// Sets the right child's key.
    fn set_right(&mut self, key: K);

    /// Sets the parent's key.
    fn set_parent(&mut self, key: K);
}

/// An intrusive binary search tree over external storage.
///
/// The tree links and unlinks nodes that the caller keeps in storage; it
/// never allocates or frees. See the [module docs](self) for the full
/// contract and an example.
#[derive(Debug, Clone)]
pub struct Tree<K: Key = u32, C = Natural> {
    root: K,
    len: usize,
    cmp: C,
}

impl<K: Key> Tree<K, Natural> {
    /// Creates an empty tree ordered by `T: Ord`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            root: K::NONE,
            len: 0,
            cmp: Natural,
        }
    }
}

impl<K: Key> Default for Tree<K, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, C> Tree<K, C> {
    /// Creates an empty tree bound to the given comparator.
    ///
    /// The comparator is fixed for the tree's lifetime.
    #[inline]
    pub const fn with_comparator(cmp: C) -> Self {
        Self {
            root: K::NONE,
            len: 0,
            cmp,
        }
    }

    /// Returns the root node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn root(&self) -> K {
        self.root
    }

    /// Returns the number of nodes in the tree.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<K: Key, C> Tree<K, C> {
    /// Inserts a node, keeping the tree ordered and keys unique.
    ///
    /// The node must already exist in storage and not be in any tree. On
    /// success its links are set and its own key is returned. If a resident
    /// node compares equal, nothing is linked and the **resident's** key is
    /// returned; the caller detects the duplicate by comparing the result
    /// against the key it passed in.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    pub fn insert<T, S>(&mut self, storage: &mut S, key: K) -> K
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
        C: Compare<T>,
    {
        if self.root.is_none() {
            let node = storage.get_mut(key).expect("invalid key");
            node.set_left(K::NONE);
            node.set_right(K::NONE);
            node.set_parent(K::NONE);
            self.root = key;
            self.len = 1;
            return key;
        }

        let mut cur = self.root;
        loop {
            let ord = {
                let cand = storage.get(key).expect("invalid key");
                // Safety: cur is a linked node (tree invariant)
                let resident = unsafe { storage.get_unchecked(cur) };
                self.cmp.compare(cand, resident)
            };

            // Safety: cur is a linked node (tree invariant)
            let branch = match ord {
                Ordering::Equal => return cur,
                Ordering::Less => unsafe { storage.get_unchecked(cur) }.left(),
                Ordering::Greater => unsafe { storage.get_unchecked(cur) }.right(),
            };

            if branch.is_some() {
                cur = branch;
                continue;
            }

            {
                let node = unsafe { storage.get_unchecked_mut(key) };
                node.set_left(K::NONE);
                node.set_right(K::NONE);
                node.set_parent(cur);
            }
            let leaf_parent = unsafe { storage.get_unchecked_mut(cur) };
            if ord == Ordering::Less {
                leaf_parent.set_left(key);
            } else {
                leaf_parent.set_right(key);
            }
            self.len += 1;
            return key;
        }
    }

    /// Finds the node whose key compares equal to `probe`.
    ///
    /// Returns `None` when the walk reaches an empty branch, including on an
    /// empty tree.
    pub fn find<T, S>(&self, storage: &S, probe: &T) -> Option<K>
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
        C: Compare<T>,
    {
        let mut cur = self.root;
        while cur.is_some() {
            // Safety: cur is a linked node (tree invariant)
            let node = unsafe { storage.get_unchecked(cur) };
            cur = match self.cmp.compare(probe, node) {
                Ordering::Equal => return Some(cur),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// Returns `true` if a node compares equal to `probe`.
    #[inline]
    pub fn contains<T, S>(&self, storage: &S, probe: &T) -> bool
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
        C: Compare<T>,
    {
        self.find(storage, probe).is_some()
    }

    /// Removes the node whose key compares equal to `probe`.
    ///
    /// Returns the unlinked node's key, or `None` if no node matches. The
    /// node stays in storage with cleared links; freeing its slot is the
    /// caller's business. Removing the root is the general case.
    pub fn remove<T, S>(&mut self, storage: &mut S, probe: &T) -> Option<K>
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
        C: Compare<T>,
    {
        let target = self.find(storage, probe)?;
        self.unlink(storage, target);

        let node = unsafe { storage.get_unchecked_mut(target) };
        node.set_left(K::NONE);
        node.set_right(K::NONE);
        node.set_parent(K::NONE);

        self.len -= 1;
        Some(target)
    }

    /// Returns the smallest node's key, or `K::NONE` if empty.
    #[inline]
    pub fn first<T, S>(&self, storage: &S) -> K
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        if self.root.is_none() {
            return K::NONE;
        }
        leftmost(storage, self.root)
    }

    /// Returns the largest node's key, or `K::NONE` if empty.
    #[inline]
    pub fn last<T, S>(&self, storage: &S) -> K
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        if self.root.is_none() {
            return K::NONE;
        }
        rightmost(storage, self.root)
    }

    /// Unlinks every node, leaving an empty tree.
    ///
    /// Visits each node once; no auxiliary stack.
    pub fn clear<T, S>(&mut self, storage: &mut S)
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        let mut cur = self.root;
        while cur.is_some() {
            // Safety: cur is a linked node (tree invariant)
            let node = unsafe { storage.get_unchecked(cur) };
            if node.left().is_some() {
                cur = node.left();
                continue;
            }
            if node.right().is_some() {
                cur = node.right();
                continue;
            }

            let parent = node.parent();
            {
                let leaf = unsafe { storage.get_unchecked_mut(cur) };
                leaf.set_parent(K::NONE);
            }
            if parent.is_some() {
                let pnode = unsafe { storage.get_unchecked_mut(parent) };
                if pnode.left() == cur {
                    pnode.set_left(K::NONE);
                } else {
                    pnode.set_right(K::NONE);
                }
            }
            cur = parent;
        }

        self.root = K::NONE;
        self.len = 0;
    }

    /// Returns an iterator over node references in ascending comparator
    /// order.
    ///
    /// The iterator borrows the storage, so the tree cannot be mutated while
    /// a traversal is live. Restarting means constructing a new iterator.
    #[inline]
    pub fn iter<'a, T, S>(&self, storage: &'a S) -> Iter<'a, T, S, K>
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        Iter {
            storage,
            next: self.first(storage),
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns an iterator over node references in descending comparator
    /// order.
    #[inline]
    pub fn iter_rev<'a, T, S>(&self, storage: &'a S) -> IterRev<'a, T, S, K>
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        IterRev {
            storage,
            next: self.last(storage),
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns an iterator over keys in ascending comparator order.
    #[inline]
    pub fn keys<'a, T, S>(&self, storage: &'a S) -> TreeKeys<'a, T, S, K>
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        TreeKeys {
            storage,
            next: self.first(storage),
            _marker: core::marker::PhantomData,
        }
    }

    /// Splices `target` out of the tree, rewiring parent and children.
    fn unlink<T, S>(&mut self, storage: &mut S, target: K)
    where
        T: TreeLinked<K>,
        S: Storage<T, Key = K>,
    {
        // Safety throughout: all keys handled here come from links of linked
        // nodes, which the tree invariant keeps occupied.
        let (left, right, parent) = {
            let node = unsafe { storage.get_unchecked(target) };
            (node.left(), node.right(), node.parent())
        };

        let replacement = if left.is_none() {
            // Leaf or right-only: the child (possibly NONE) takes the slot
            if right.is_some() {
                unsafe { storage.get_unchecked_mut(right) }.set_parent(parent);
            }
            right
        } else if right.is_none() {
            unsafe { storage.get_unchecked_mut(left) }.set_parent(parent);
            left
        } else {
            // Two children: promote the in-order successor, the leftmost
            // node of the right subtree. It has no left child by definition.
            let succ = leftmost(storage, right);

            if succ != right {
                // Splice the successor out of its original position: its
                // right child (possibly NONE) replaces it under its parent.
                let succ_parent = unsafe { storage.get_unchecked(succ) }.parent();
                let succ_right = unsafe { storage.get_unchecked(succ) }.right();
                unsafe { storage.get_unchecked_mut(succ_parent) }.set_left(succ_right);
                if succ_right.is_some() {
                    unsafe { storage.get_unchecked_mut(succ_right) }.set_parent(succ_parent);
                }
                // Take over the removed node's right subtree
                unsafe { storage.get_unchecked_mut(succ) }.set_right(right);
                unsafe { storage.get_unchecked_mut(right) }.set_parent(succ);
            }

            // Take over the removed node's left subtree and position
            {
                let snode = unsafe { storage.get_unchecked_mut(succ) };
                snode.set_left(left);
                snode.set_parent(parent);
            }
            unsafe { storage.get_unchecked_mut(left) }.set_parent(succ);
            succ
        };

        if parent.is_none() {
            self.root = replacement;
        } else {
            let pnode = unsafe { storage.get_unchecked_mut(parent) };
            if pnode.left() == target {
                pnode.set_left(replacement);
            } else {
                pnode.set_right(replacement);
            }
        }
    }
}

#[inline]
fn leftmost<T, S, K>(storage: &S, mut key: K) -> K
where
    K: Key,
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    // Safety: callers pass a linked node; children of linked nodes are linked
    loop {
        let left = unsafe { storage.get_unchecked(key) }.left();
        if left.is_none() {
            return key;
        }
        key = left;
    }
}

#[inline]
fn rightmost<T, S, K>(storage: &S, mut key: K) -> K
where
    K: Key,
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    loop {
        // Safety: see leftmost
        let right = unsafe { storage.get_unchecked(key) }.right();
        if right.is_none() {
            return key;
        }
        key = right;
    }
}

/// In-order successor via parent links; `K::NONE` after the largest node.
#[inline]
pub(crate) fn successor<T, S, K>(storage: &S, key: K) -> K
where
    K: Key,
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    // Safety: key is a linked node, ancestors and children are linked
    let node = unsafe { storage.get_unchecked(key) };
    if node.right().is_some() {
        return leftmost(storage, node.right());
    }

    let mut cur = key;
    let mut parent = node.parent();
    while parent.is_some() {
        let pnode = unsafe { storage.get_unchecked(parent) };
        if pnode.right() != cur {
            break;
        }
        cur = parent;
        parent = pnode.parent();
    }
    parent
}

/// In-order predecessor via parent links; `K::NONE` before the smallest node.
#[inline]
pub(crate) fn predecessor<T, S, K>(storage: &S, key: K) -> K
where
    K: Key,
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    // Safety: see successor
    let node = unsafe { storage.get_unchecked(key) };
    if node.left().is_some() {
        return rightmost(storage, node.left());
    }

    let mut cur = key;
    let mut parent = node.parent();
    while parent.is_some() {
        let pnode = unsafe { storage.get_unchecked(parent) };
        if pnode.left() != cur {
            break;
        }
        cur = parent;
        parent = pnode.parent();
    }
    parent
}

/// Ascending in-order iterator over node references.
pub struct Iter<'a, T, S, K: Key> {
    storage: &'a S,
    next: K,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for Iter<'a, T, S, K>
where
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        // Safety: next is a linked node (tree invariant)
        let node = unsafe { self.storage.get_unchecked(self.next) };
        self.next = successor(self.storage, self.next);
        Some(node)
    }
}

/// Descending in-order iterator over node references.
pub struct IterRev<'a, T, S, K: Key> {
    storage: &'a S,
    next: K,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for IterRev<'a, T, S, K>
where
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        // Safety: next is a linked node (tree invariant)
        let node = unsafe { self.storage.get_unchecked(self.next) };
        self.next = predecessor(self.storage, self.next);
        Some(node)
    }
}

/// Ascending in-order iterator over keys.
pub struct TreeKeys<'a, T, S, K: Key> {
    storage: &'a S,
    next: K,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for TreeKeys<'a, T, S, K>
where
    T: TreeLinked<K>,
    S: Storage<T, Key = K>,
{
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let key = self.next;
        self.next = successor(self.storage, self.next);
        Some(key)
    }
}
