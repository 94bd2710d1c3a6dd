//! Intrusive doubly-linked list.
//!
//! Nodes embed their own prev/next keys via the [`Linked`] trait, so removal
//! from the middle is O(1) given only a node's key. The list never owns the
//! data: it links and unlinks nodes that the caller keeps in storage, and an
//! object can sit in several lists at once by embedding one link pair per
//! list.

use crate::{Key, Storage};

/// Trait for types that can participate in a doubly-linked list.
///
/// Implementors embed prev/next keys directly in their struct.
///
/// # Example
///
/// ```
/// use arbor_collections::{Key, Linked};
///
/// struct Order {
///     id: u64,
///     qty: u64,
///     next: u32,
///     prev: u32,
/// }
///
/// impl Linked<u32> for Order {
///     fn next(&self) -> u32 { self.next }
///     fn prev(&self) -> u32 { self.prev }
///     fn set_next(&mut self, key: u32) { self.next = key; }
///     fn set_prev(&mut self, key: u32) { self.prev = key; }
/// }
/// ```
pub trait Linked<K: Key> {
    /// Returns the next node's key, or `K::NONE` if this is the tail.
    fn next(&self) -> K;

    /// Returns the previous node's key, or `K::NONE` if this is the head.
    fn prev(&self) -> K;

    /// Sets the next node's key.
    fn set_next(&mut self, key: K);

    /// Sets the previous node's key.
    fn set_prev(&mut self, key: K);
}

/// A doubly-linked list over external storage.
///
/// The list itself stores only head, tail, and length.
///
/// # Example
///
/// ```
/// use arbor_collections::{BoundedStorage, Key, Linked, LinkedList, Pool};
///
/// #[derive(Debug)]
/// struct Node {
///     value: u64,
///     next: u32,
///     prev: u32,
/// }
///
/// impl Node {
///     fn new(value: u64) -> Self {
///         Self { value, next: u32::NONE, prev: u32::NONE }
///     }
/// }
///
/// impl Linked<u32> for Node {
///     fn next(&self) -> u32 { self.next }
///     fn prev(&self) -> u32 { self.prev }
///     fn set_next(&mut self, key: u32) { self.next = key; }
///     fn set_prev(&mut self, key: u32) { self.prev = key; }
/// }
///
/// let mut pool: Pool<Node> = Pool::with_capacity(16);
/// let mut list: LinkedList<u32> = LinkedList::new();
///
/// let a = pool.try_insert(Node::new(1)).unwrap();
/// let b = pool.try_insert(Node::new(2)).unwrap();
/// let c = pool.try_insert(Node::new(3)).unwrap();
///
/// list.push_back(&mut pool, a);
/// list.push_back(&mut pool, b);
/// list.push_back(&mut pool, c);
///
/// // O(1) removal from the middle
/// list.remove(&mut pool, b);
/// assert_eq!(list.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LinkedList<K: Key = u32> {
    head: K,
    tail: K,
    len: usize,
}

impl<K: Key> Default for LinkedList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> LinkedList<K> {
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
        }
    }

    /// Returns the head node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> K {
        self.head
    }

    /// Returns the tail node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn tail(&self) -> K {
        self.tail
    }

    /// Returns the number of nodes in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a node at the tail.
    ///
    /// The node must already exist in storage and not be in any list.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn push_back<T, S>(&mut self, storage: &mut S, key: K)
    where
        T: Linked<K>,
        S: Storage<T, Key = K>,
    {
        {
            let node = storage.get_mut(key).expect("invalid key");
            node.set_prev(self.tail);
            node.set_next(K::NONE);
        }

        if self.tail.is_some() {
            // Safety: tail is valid when not NONE (list invariant)
            unsafe { storage.get_unchecked_mut(self.tail) }.set_next(key);
        } else {
            self.head = key;
        }

        self.tail = key;
        self.len += 1;
    }

    /// Prepends a node at the head.
    ///
    /// The node must already exist in storage and not be in any list.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn push_front<T, S>(&mut self, storage: &mut S, key: K)
    where
        T: Linked<K>,
        S: Storage<T, Key = K>,
    {
        {
            let node = storage.get_mut(key).expect("invalid key");
            node.set_next(self.head);
            node.set_prev(K::NONE);
        }

        if self.head.is_some() {
            // Safety: head is valid when not NONE (list invariant)
            unsafe { storage.get_unchecked_mut(self.head) }.set_prev(key);
        } else {
            self.tail = key;
        }

        self.head = key;
        self.len += 1;
    }

    /// Removes and returns the head node's key, or `K::NONE` if empty.
    ///
    /// The node stays in storage; only its links are cleared.
    #[inline]
    pub fn pop_front<T, S>(&mut self, storage: &mut S) -> K
    where
        T: Linked<K>,
        S: Storage<T, Key = K>,
    {
        if self.head.is_none() {
            return K::NONE;
        }

        let key = self.head;
        self.remove(storage, key);
        key
    }

    /// Removes and returns the tail node's key, or `K::NONE` if empty.
    ///
    /// The node stays in storage; only its links are cleared.
    #[inline]
    pub fn pop_back<T, S>(&mut self, storage: &mut S) -> K
    where
        T: Linked<K>,
        S: Storage<T, Key = K>,
    {
        if self.tail.is_none() {
            return K::NONE;
        }

        let key = self.tail;
        self.remove(storage, key);
        key
    }

    /// Removes a node from the list in O(1).
    ///
    /// The node stays in storage; only its links are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn remove<T, S>(&mut self, storage: &mut S, key: K)
    where
        T: Linked<K>,
        S: Storage<T, Key = K>,
    {
        let (prev, next) = {
            let node = storage.get(key).expect("invalid key");
            (node.prev(), node.next())
        };

        if prev.is_some() {
            // Safety: prev is valid when not NONE (list invariant)
            unsafe { storage.get_unchecked_mut(prev) }.set_next(next);
        } else {
            self.head = next;
        }

        if next.is_some() {
            // Safety: next is valid when not NONE (list invariant)
            unsafe { storage.get_unchecked_mut(next) }.set_prev(prev);
        } else {
            self.tail = prev;
        }

        // Safety: key validated above
        let node = unsafe { storage.get_unchecked_mut(key) };
        node.set_prev(K::NONE);
        node.set_next(K::NONE);

        self.len -= 1;
    }

    /// Unlinks every node, leaving an empty list.
    pub fn clear<T, S>(&mut self, storage: &mut S)
    where
        T: Linked<K>,
        S: Storage<T, Key = K>,
    {
        let mut key = self.head;
        while key.is_some() {
            // Safety: list invariant, every linked key is occupied
            let node = unsafe { storage.get_unchecked_mut(key) };
            let next = node.next();
            node.set_prev(K::NONE);
            node.set_next(K::NONE);
            key = next;
        }

        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }
}
