//! Doubly-linked deque over wrapped nodes in external storage.
//!
//! Unlike [`LinkedList`](crate::LinkedList), which requires the element type
//! to embed its own links, this container wraps plain values in a
//! [`ListNode`] that carries the links. Push operations allocate the node in
//! storage; pop and remove free it and hand the value back. Use this form
//! when the element type cannot be modified, or when a value belongs to
//! exactly one list.
//!
//! # Example
//!
//! ```
//! use arbor_collections::{Deque, ListNode, Pool};
//!
//! let mut pool: Pool<ListNode<&str>> = Pool::with_capacity(8);
//! let mut deque = Deque::new();
//!
//! deque.try_push_back(&mut pool, "a").unwrap();
//! deque.try_push_back(&mut pool, "b").unwrap();
//! deque.try_push_front(&mut pool, "z").unwrap();
//!
//! assert_eq!(deque.pop_front(&mut pool), Some("z"));
//! assert_eq!(deque.pop_back(&mut pool), Some("b"));
//! assert_eq!(deque.pop_front(&mut pool), Some("a"));
//! assert_eq!(deque.pop_front(&mut pool), None);
//! ```

use core::marker::PhantomData;

use crate::{BoundedStorage, Full, Key, Storage, UnboundedStorage};

/// A list node wrapping a value together with its links.
///
/// Constructed internally by [`Deque`]; callers only choose the storage that
/// holds them, e.g. `Pool<ListNode<T>>`.
#[derive(Debug)]
pub struct ListNode<T, K: Key = u32> {
    data: T,
    prev: K,
    next: K,
}

impl<T, K: Key> ListNode<T, K> {
    #[inline]
    fn new(data: T) -> Self {
        Self {
            data,
            prev: K::NONE,
            next: K::NONE,
        }
    }

    /// Returns a reference to the wrapped value.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns a mutable reference to the wrapped value.
    #[inline]
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

/// A double-ended queue of values held in external storage.
///
/// The deque owns the values logically: pushes move values in, pops move
/// them out, and node allocation in the backing storage is handled
/// internally. `try_push_*` methods go with [`BoundedStorage`], `push_*`
/// with [`UnboundedStorage`].
#[derive(Debug)]
pub struct Deque<T, K: Key = u32> {
    head: K,
    tail: K,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T, K: Key> Default for Deque<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Key> Deque<T, K> {
    /// Creates an empty deque.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of values in the deque.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the deque is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the front node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> K {
        self.head
    }

    /// Returns the back node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn tail(&self) -> K {
        self.tail
    }

    /// Pushes a value at the back, failing when storage is full.
    ///
    /// Returns the new node's key; the value rides back out in the error
    /// when storage has no free slot.
    pub fn try_push_back<S>(&mut self, storage: &mut S, value: T) -> Result<K, Full<T>>
    where
        S: BoundedStorage<ListNode<T, K>, Key = K>,
    {
        let key = storage
            .try_insert(ListNode::new(value))
            .map_err(|e| Full(e.0.data))?;
        self.link_back(storage, key);
        Ok(key)
    }

    /// Pushes a value at the front, failing when storage is full.
    pub fn try_push_front<S>(&mut self, storage: &mut S, value: T) -> Result<K, Full<T>>
    where
        S: BoundedStorage<ListNode<T, K>, Key = K>,
    {
        let key = storage
            .try_insert(ListNode::new(value))
            .map_err(|e| Full(e.0.data))?;
        self.link_front(storage, key);
        Ok(key)
    }

    /// Pushes a value at the back of growable storage.
    pub fn push_back<S>(&mut self, storage: &mut S, value: T) -> K
    where
        S: UnboundedStorage<ListNode<T, K>, Key = K>,
    {
        let key = storage.insert(ListNode::new(value));
        self.link_back(storage, key);
        key
    }

    /// Pushes a value at the front of growable storage.
    pub fn push_front<S>(&mut self, storage: &mut S, value: T) -> K
    where
        S: UnboundedStorage<ListNode<T, K>, Key = K>,
    {
        let key = storage.insert(ListNode::new(value));
        self.link_front(storage, key);
        key
    }

    /// Pops the front value, freeing its node.
    pub fn pop_front<S>(&mut self, storage: &mut S) -> Option<T>
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        if self.head.is_none() {
            return None;
        }
        let key = self.head;
        self.unlink(storage, key);
        // Safety: key was linked, so it is occupied
        let node = unsafe { storage.remove_unchecked(key) };
        Some(node.data)
    }

    /// Pops the back value, freeing its node.
    pub fn pop_back<S>(&mut self, storage: &mut S) -> Option<T>
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        if self.tail.is_none() {
            return None;
        }
        let key = self.tail;
        self.unlink(storage, key);
        // Safety: key was linked, so it is occupied
        let node = unsafe { storage.remove_unchecked(key) };
        Some(node.data)
    }

    /// Removes the node at `key` in O(1), freeing it and returning the value.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a node of this deque.
    pub fn remove<S>(&mut self, storage: &mut S, key: K) -> T
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        storage.get(key).expect("invalid key");
        self.unlink(storage, key);
        // Safety: checked occupied above
        let node = unsafe { storage.remove_unchecked(key) };
        node.data
    }

    /// Returns a reference to the front value.
    #[inline]
    pub fn front<'a, S>(&self, storage: &'a S) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
        S: Storage<ListNode<T, K>, Key = K>,
    {
        storage.get(self.head).map(|node| &node.data)
    }

    /// Returns a reference to the back value.
    #[inline]
    pub fn back<'a, S>(&self, storage: &'a S) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
        S: Storage<ListNode<T, K>, Key = K>,
    {
        storage.get(self.tail).map(|node| &node.data)
    }

    /// Returns a reference to the value at `key`.
    #[inline]
    pub fn get<'a, S>(&self, storage: &'a S, key: K) -> Option<&'a T>
    where
        T: 'a,
        K: 'a,
        S: Storage<ListNode<T, K>, Key = K>,
    {
        storage.get(key).map(|node| &node.data)
    }

    /// Returns a mutable reference to the value at `key`.
    #[inline]
    pub fn get_mut<'a, S>(&self, storage: &'a mut S, key: K) -> Option<&'a mut T>
    where
        T: 'a,
        K: 'a,
        S: Storage<ListNode<T, K>, Key = K>,
    {
        storage.get_mut(key).map(|node| &mut node.data)
    }

    /// Pops every value, freeing all nodes.
    pub fn clear<S>(&mut self, storage: &mut S)
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        let mut cur = self.head;
        while cur.is_some() {
            // Safety: cur is a linked node
            let node = unsafe { storage.remove_unchecked(cur) };
            cur = node.next;
        }
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }

    /// Returns a double-ended iterator over value references, front to back.
    #[inline]
    pub fn iter<'a, S>(&self, storage: &'a S) -> Iter<'a, T, S, K>
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        Iter {
            storage,
            front: self.head,
            back: self.tail,
            done: self.head.is_none(),
            _marker: PhantomData,
        }
    }

    fn link_back<S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        if self.tail.is_none() {
            self.head = key;
            self.tail = key;
        } else {
            // Safety: tail is a linked node; key was just inserted
            unsafe {
                storage.get_unchecked_mut(self.tail).next = key;
                storage.get_unchecked_mut(key).prev = self.tail;
            }
            self.tail = key;
        }
        self.len += 1;
    }

    fn link_front<S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        if self.head.is_none() {
            self.head = key;
            self.tail = key;
        } else {
            // Safety: head is a linked node; key was just inserted
            unsafe {
                storage.get_unchecked_mut(self.head).prev = key;
                storage.get_unchecked_mut(key).next = self.head;
            }
            self.head = key;
        }
        self.len += 1;
    }

    fn unlink<S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<ListNode<T, K>, Key = K>,
    {
        // Safety: key is a linked node, so are its neighbors
        let (prev, next) = {
            let node = unsafe { storage.get_unchecked(key) };
            (node.prev, node.next)
        };

        if prev.is_some() {
            unsafe { storage.get_unchecked_mut(prev) }.next = next;
        } else {
            self.head = next;
        }
        if next.is_some() {
            unsafe { storage.get_unchecked_mut(next) }.prev = prev;
        } else {
            self.tail = prev;
        }
        self.len -= 1;
    }
}

/// Double-ended iterator over a [`Deque`]'s values.
pub struct Iter<'a, T, S, K: Key> {
    storage: &'a S,
    front: K,
    back: K,
    done: bool,
    _marker: PhantomData<T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for Iter<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // Safety: front is a linked node
        let node = unsafe { self.storage.get_unchecked(self.front) };
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = node.next;
        }
        Some(&node.data)
    }
}

impl<'a, T: 'a, S, K: Key + 'a> DoubleEndedIterator for Iter<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // Safety: back is a linked node
        let node = unsafe { self.storage.get_unchecked(self.back) };
        if self.front == self.back {
            self.done = true;
        } else {
            self.back = node.prev;
        }
        Some(&node.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pool;

    fn pool(capacity: usize) -> Pool<ListNode<i32>> {
        Pool::with_capacity(capacity)
    }

    #[test]
    fn new_deque_is_empty() {
        let storage = pool(4);
        let deque: Deque<i32> = Deque::new();

        assert!(deque.is_empty());
        assert_eq!(deque.len(), 0);
        assert!(deque.front(&storage).is_none());
        assert!(deque.back(&storage).is_none());
    }

    #[test]
    fn push_back_pop_front_is_fifo() {
        let mut storage = pool(8);
        let mut deque = Deque::new();

        for v in 1..=4 {
            deque.try_push_back(&mut storage, v).unwrap();
        }

        assert_eq!(deque.len(), 4);
        for v in 1..=4 {
            assert_eq!(deque.pop_front(&mut storage), Some(v));
        }
        assert_eq!(deque.pop_front(&mut storage), None);
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn push_front_pop_front_is_lifo() {
        let mut storage = pool(8);
        let mut deque = Deque::new();

        for v in 1..=4 {
            deque.try_push_front(&mut storage, v).unwrap();
        }

        for v in (1..=4).rev() {
            assert_eq!(deque.pop_front(&mut storage), Some(v));
        }
    }

    #[test]
    fn pop_back_drains_in_reverse() {
        let mut storage = pool(8);
        let mut deque = Deque::new();

        for v in 1..=4 {
            deque.try_push_back(&mut storage, v).unwrap();
        }

        for v in (1..=4).rev() {
            assert_eq!(deque.pop_back(&mut storage), Some(v));
        }
        assert_eq!(deque.pop_back(&mut storage), None);
    }

    #[test]
    fn full_storage_hands_the_value_back() {
        let mut storage = pool(2);
        let mut deque = Deque::new();

        deque.try_push_back(&mut storage, 1).unwrap();
        deque.try_push_back(&mut storage, 2).unwrap();

        let err = deque.try_push_back(&mut storage, 3).unwrap_err();
        assert_eq!(err.into_inner(), 3);
        assert_eq!(deque.len(), 2);
    }

    #[test]
    fn remove_by_key_is_positional() {
        let mut storage = pool(8);
        let mut deque = Deque::new();

        let _a = deque.try_push_back(&mut storage, 1).unwrap();
        let b = deque.try_push_back(&mut storage, 2).unwrap();
        let _c = deque.try_push_back(&mut storage, 3).unwrap();

        assert_eq!(deque.remove(&mut storage, b), 2);
        assert_eq!(deque.len(), 2);

        let values: Vec<i32> = deque.iter(&storage).copied().collect();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn get_and_get_mut() {
        let mut storage = pool(4);
        let mut deque = Deque::new();

        let k = deque.try_push_back(&mut storage, 10).unwrap();
        assert_eq!(deque.get(&storage, k), Some(&10));

        *deque.get_mut(&mut storage, k).unwrap() = 20;
        assert_eq!(deque.front(&storage), Some(&20));
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let mut storage = pool(8);
        let mut deque = Deque::new();

        for v in 1..=5 {
            deque.try_push_back(&mut storage, v).unwrap();
        }

        let mut iter = deque.iter(&storage);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn clear_frees_all_nodes() {
        let mut storage = pool(8);
        let mut deque = Deque::new();

        for v in 1..=5 {
            deque.try_push_back(&mut storage, v).unwrap();
        }

        deque.clear(&mut storage);
        assert!(deque.is_empty());
        assert_eq!(storage.len(), 0);

        // Slots are reusable afterwards
        deque.try_push_back(&mut storage, 9).unwrap();
        assert_eq!(deque.front(&storage), Some(&9));
    }

    #[cfg(feature = "slab")]
    #[test]
    fn grows_with_slab_storage() {
        let mut storage: slab::Slab<ListNode<i32, usize>> = slab::Slab::new();
        let mut deque: Deque<i32, usize> = Deque::new();

        for v in 0..100 {
            deque.push_back(&mut storage, v);
        }
        assert_eq!(deque.len(), 100);
        assert_eq!(deque.pop_front(&mut storage), Some(0));
        assert_eq!(deque.pop_back(&mut storage), Some(99));
    }
}
