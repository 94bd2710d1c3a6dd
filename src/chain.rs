//! Intrusive singly-linked stack and queue.
//!
//! Host types embed a single forward link via the [`Chained`] trait; the
//! containers store only head (and tail, for the queue) plus a count. No
//! ordering, no uniqueness, every operation O(1). This is the shape the
//! pool's free list is classically built on.

use crate::{Key, Storage};

/// Trait for types that carry one forward link.
///
/// # Example
///
/// ```
/// use arbor_collections::{Chained, Key};
///
/// struct Job {
///     id: u64,
///     next: u32,
/// }
///
/// impl Chained<u32> for Job {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, key: u32) { self.next = key; }
/// }
/// ```
pub trait Chained<K: Key> {
    /// Returns the next node's key, or `K::NONE` at the end of the chain.
    fn next(&self) -> K;

    /// Sets the next node's key.
    fn set_next(&mut self, key: K);
}

/// An intrusive LIFO stack.
///
/// Nodes live in caller-provided storage; the stack only links and unlinks
/// them. Popping returns the node's key, not the value.
#[derive(Debug, Clone)]
pub struct Stack<K: Key = u32> {
    head: K,
    len: usize,
}

impl<K: Key> Default for Stack<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Stack<K> {
    /// Creates an empty stack.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            len: 0,
        }
    }

    /// Returns the top node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> K {
        self.head
    }

    /// Returns the number of nodes on the stack.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the stack is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pushes a node on top of the stack.
    ///
    /// The node must already exist in storage and not be on any chain.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn push<T, S>(&mut self, storage: &mut S, key: K)
    where
        T: Chained<K>,
        S: Storage<T, Key = K>,
    {
        storage.get_mut(key).expect("invalid key").set_next(self.head);
        self.head = key;
        self.len += 1;
    }

    /// Pops the top node's key, or `K::NONE` if the stack is empty.
    ///
    /// The node stays in storage; only its link is cleared.
    #[inline]
    pub fn pop<T, S>(&mut self, storage: &mut S) -> K
    where
        T: Chained<K>,
        S: Storage<T, Key = K>,
    {
        if self.head.is_none() {
            return K::NONE;
        }

        let key = self.head;
        // Safety: head is valid when not NONE (stack invariant)
        let node = unsafe { storage.get_unchecked_mut(key) };
        self.head = node.next();
        node.set_next(K::NONE);
        self.len -= 1;
        key
    }

    /// Unlinks every node, leaving an empty stack.
    pub fn clear<T, S>(&mut self, storage: &mut S)
    where
        T: Chained<K>,
        S: Storage<T, Key = K>,
    {
        let mut key = self.head;
        while key.is_some() {
            // Safety: chain invariant, every linked key is occupied
            let node = unsafe { storage.get_unchecked_mut(key) };
            let next = node.next();
            node.set_next(K::NONE);
            key = next;
        }
        self.head = K::NONE;
        self.len = 0;
    }
}

/// An intrusive FIFO queue.
///
/// Enqueues at the tail, dequeues at the head, both O(1).
#[derive(Debug, Clone)]
pub struct Queue<K: Key = u32> {
    head: K,
    tail: K,
    len: usize,
}

impl<K: Key> Default for Queue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Queue<K> {
    /// Creates an empty queue.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
        }
    }

    /// Returns the front node's key, or `K::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> K {
        self.head
    }

    /// Returns the number of nodes in the queue.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a node at the tail.
    ///
    /// The node must already exist in storage and not be on any chain.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn enqueue<T, S>(&mut self, storage: &mut S, key: K)
    where
        T: Chained<K>,
        S: Storage<T, Key = K>,
    {
        storage.get_mut(key).expect("invalid key").set_next(K::NONE);

        if self.tail.is_some() {
            // Safety: tail is valid when not NONE (queue invariant)
            unsafe { storage.get_unchecked_mut(self.tail) }.set_next(key);
        } else {
            self.head = key;
        }

        self.tail = key;
        self.len += 1;
    }

    /// Removes and returns the front node's key, or `K::NONE` if empty.
    ///
    /// The node stays in storage; only its link is cleared.
    #[inline]
    pub fn dequeue<T, S>(&mut self, storage: &mut S) -> K
    where
        T: Chained<K>,
        S: Storage<T, Key = K>,
    {
        if self.head.is_none() {
            return K::NONE;
        }

        let key = self.head;
        // Safety: head is valid when not NONE (queue invariant)
        let node = unsafe { storage.get_unchecked_mut(key) };
        self.head = node.next();
        node.set_next(K::NONE);
        if self.head.is_none() {
            self.tail = K::NONE;
        }
        self.len -= 1;
        key
    }

    /// Unlinks every node, leaving an empty queue.
    pub fn clear<T, S>(&mut self, storage: &mut S)
    where
        T: Chained<K>,
        S: Storage<T, Key = K>,
    {
        let mut key = self.head;
        while key.is_some() {
            // Safety: chain invariant, every linked key is occupied
            let node = unsafe { storage.get_unchecked_mut(key) };
            let next = node.next();
            node.set_next(K::NONE);
            key = next;
        }
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundedStorage, Pool};

    #[derive(Debug)]
    struct Node {
        value: u64,
        next: u32,
    }

    impl Node {
        fn new(value: u64) -> Self {
            Self {
                value,
                next: u32::NONE,
            }
        }
    }

    impl Chained<u32> for Node {
        fn next(&self) -> u32 {
            self.next
        }
        fn set_next(&mut self, key: u32) {
            self.next = key;
        }
    }

    fn pool_with(values: &[u64]) -> (Pool<Node>, Vec<u32>) {
        let mut pool: Pool<Node> = Pool::with_capacity(16);
        let keys = values
            .iter()
            .map(|&v| pool.try_insert(Node::new(v)).unwrap())
            .collect();
        (pool, keys)
    }

    #[test]
    fn stack_is_lifo() {
        let (mut pool, keys) = pool_with(&[1, 2, 3]);
        let mut stack: Stack<u32> = Stack::new();

        for &k in &keys {
            stack.push(&mut pool, k);
        }
        assert_eq!(stack.len(), 3);

        assert_eq!(stack.pop(&mut pool), keys[2]);
        assert_eq!(stack.pop(&mut pool), keys[1]);
        assert_eq!(stack.pop(&mut pool), keys[0]);
        assert!(stack.is_empty());
        assert!(stack.pop(&mut pool).is_none());
    }

    #[test]
    fn queue_is_fifo() {
        let (mut pool, keys) = pool_with(&[1, 2, 3]);
        let mut queue: Queue<u32> = Queue::new();

        for &k in &keys {
            queue.enqueue(&mut pool, k);
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.dequeue(&mut pool), keys[0]);
        assert_eq!(queue.dequeue(&mut pool), keys[1]);
        assert_eq!(queue.dequeue(&mut pool), keys[2]);
        assert!(queue.is_empty());
        assert!(queue.dequeue(&mut pool).is_none());
    }

    #[test]
    fn queue_refills_after_drain() {
        let (mut pool, keys) = pool_with(&[1, 2]);
        let mut queue: Queue<u32> = Queue::new();

        queue.enqueue(&mut pool, keys[0]);
        assert_eq!(queue.dequeue(&mut pool), keys[0]);
        assert!(queue.head().is_none());

        queue.enqueue(&mut pool, keys[1]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(&mut pool), keys[1]);
    }

    #[test]
    fn clear_unlinks_all() {
        let (mut pool, keys) = pool_with(&[1, 2, 3]);
        let mut stack: Stack<u32> = Stack::new();

        for &k in &keys {
            stack.push(&mut pool, k);
        }
        stack.clear(&mut pool);

        assert!(stack.is_empty());
        for &k in &keys {
            assert!(pool.get(k).unwrap().next.is_none());
        }
        // Values untouched
        assert_eq!(pool.get(keys[0]).unwrap().value, 1);
    }
}
