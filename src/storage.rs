//! Storage traits and the fixed-capacity pool.
//!
//! Storage owns the data and hands out stable keys; containers coordinate
//! keys and never own data. A key remains valid until explicitly removed,
//! which lets linked structures (lists, trees) hold indices instead of
//! pointers.
//!
//! # Storage Invariant
//!
//! A container instance must always be used with the same storage instance.
//! Passing a different storage is not memory-unsafe here (keys are bounds
//! checked), but it corrupts the container's links. This is the caller's
//! responsibility to enforce, the same discipline the `slab` crate asks for.

use core::fmt;
use core::mem::MaybeUninit;

use crate::Key;

/// Base storage trait: stable keys, O(1) access and removal.
///
/// Implementations must provide:
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** get and remove
/// - **Slot reuse**: removed slots can be reused by future insertions
pub trait Storage<T> {
    /// Key type handed out by this storage.
    type Key: Key;

    /// Returns a reference to the value at `key`, if occupied.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if occupied.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Removes and returns the value at `key`, if occupied.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slots are occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked(&self, key: Self::Key) -> &T;

    /// Returns a mutable reference without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked_mut(&mut self, key: Self::Key) -> &mut T;

    /// Removes a value without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn remove_unchecked(&mut self, key: Self::Key) -> T;
}

/// Fixed-capacity storage: insertion can fail with [`Full`].
pub trait BoundedStorage<T>: Storage<T> {
    /// Inserts a value, returning its key, or `Err(Full(value))` when no
    /// slot is free.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Full<T>>;

    /// Returns the total number of slots.
    fn capacity(&self) -> usize;

    /// Returns `true` if every slot is occupied.
    #[inline]
    fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

/// Growable storage: insertion never fails.
pub trait UnboundedStorage<T>: Storage<T> {
    /// Inserts a value, returning its key.
    fn insert(&mut self, value: T) -> Self::Key;
}

/// Error returned when fixed-capacity storage has no free slot.
///
/// Carries the value that could not be inserted, so the caller can retry or
/// route it elsewhere. Exhaustion is recoverable, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage is full")
    }
}

impl<T: fmt::Debug> std::error::Error for Full<T> {}

// =============================================================================
// Pool - fixed-capacity slot storage with LIFO reuse
// =============================================================================

/// Fixed-capacity pool storage.
///
/// All memory is allocated once at construction: an entry array, an occupancy
/// bitmap, and a free stack of slot indices. The pool never grows, never
/// shrinks, and never allocates on the insert/remove path.
///
/// Freed slots are reused in LIFO order: the most recently removed slot is
/// the next one handed out. No locality guarantee beyond that recency.
///
/// # Example
///
/// ```
/// use arbor_collections::{BoundedStorage, Pool, Storage};
///
/// let mut pool: Pool<u64> = Pool::with_capacity(1000);
///
/// let key = pool.try_insert(42).unwrap();
/// assert_eq!(pool.get(key), Some(&42));
///
/// assert_eq!(pool.remove(key), Some(42));
/// assert_eq!(pool.get(key), None);
/// ```
pub struct Pool<T, K: Key = u32> {
    /// Slot array; occupancy is tracked by the bitmap, not in the slots.
    entries: Box<[MaybeUninit<T>]>,
    /// One bit per slot, set = occupied.
    occupied: Box<[u64]>,
    /// Stack of free slot indices; `free[..free_len]` are live.
    free: Box<[K]>,
    free_len: usize,
}

impl<T, K: Key> Pool<T, K> {
    /// Creates a pool with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or would collide with the key sentinel.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        assert!(
            capacity <= K::NONE.as_usize(),
            "capacity exceeds key type maximum"
        );

        let entries: Box<[MaybeUninit<T>]> =
            (0..capacity).map(|_| MaybeUninit::uninit()).collect();
        let occupied = vec![0u64; bitmap_words(capacity)].into_boxed_slice();
        // Descending so the first insertions pop slots 0, 1, 2, ...
        let free: Box<[K]> = (0..capacity).rev().map(K::from_usize).collect();

        Self {
            entries,
            occupied,
            free,
            free_len: capacity,
        }
    }

    /// Returns the total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.capacity() - self.free_len
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.free_len == self.capacity()
    }

    /// Returns `true` if every slot is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_len == 0
    }

    /// Drops all stored values and makes every slot available again.
    ///
    /// # Warning
    ///
    /// Any container still holding keys into this pool is left with dangling
    /// keys. Clear those containers first, or use an owning wrapper such as
    /// [`OwnedSet`](crate::OwnedSet) which handles this for you.
    pub fn clear(&mut self) {
        for i in 0..self.capacity() {
            if self.bit(i) {
                // Safety: bit set means the slot was initialized by try_insert
                unsafe { self.entries[i].assume_init_drop() };
            }
        }
        self.occupied.fill(0);
        for (n, slot) in self.free.iter_mut().enumerate() {
            *slot = K::from_usize(self.entries.len() - 1 - n);
        }
        self.free_len = self.entries.len();
    }

    #[inline]
    fn bit(&self, i: usize) -> bool {
        (self.occupied[i / 64] >> (i % 64)) & 1 != 0
    }

    #[inline]
    fn set_bit(&mut self, i: usize) {
        self.occupied[i / 64] |= 1 << (i % 64);
    }

    #[inline]
    fn clear_bit(&mut self, i: usize) {
        self.occupied[i / 64] &= !(1 << (i % 64));
    }
}

impl<T, K: Key> Storage<T> for Pool<T, K> {
    type Key = K;

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        let i = key.as_usize();
        if i >= self.capacity() || !self.bit(i) {
            return None;
        }
        // Safety: occupancy bit set
        Some(unsafe { self.entries[i].assume_init_ref() })
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let i = key.as_usize();
        if i >= self.capacity() || !self.bit(i) {
            return None;
        }
        // Safety: occupancy bit set
        Some(unsafe { self.entries[i].assume_init_mut() })
    }

    #[inline]
    fn remove(&mut self, key: K) -> Option<T> {
        let i = key.as_usize();
        if i >= self.capacity() || !self.bit(i) {
            return None;
        }
        // Safety: occupancy bit set, cleared before the value is moved out
        Some(unsafe { self.remove_unchecked(key) })
    }

    #[inline]
    fn len(&self) -> usize {
        Pool::len(self)
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: K) -> &T {
        // Safety: caller guarantees key is valid and occupied
        unsafe { self.entries.get_unchecked(key.as_usize()).assume_init_ref() }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: K) -> &mut T {
        // Safety: caller guarantees key is valid and occupied
        unsafe {
            self.entries
                .get_unchecked_mut(key.as_usize())
                .assume_init_mut()
        }
    }

    #[inline]
    unsafe fn remove_unchecked(&mut self, key: K) -> T {
        let i = key.as_usize();
        self.clear_bit(i);
        // Safety: caller guarantees the slot is occupied; bit is now clear so
        // neither Drop nor clear() will touch it again
        let value = unsafe { self.entries[i].assume_init_read() };
        self.free[self.free_len] = key;
        self.free_len += 1;
        value
    }
}

impl<T, K: Key> BoundedStorage<T> for Pool<T, K> {
    #[inline]
    fn try_insert(&mut self, value: T) -> Result<K, Full<T>> {
        if self.free_len == 0 {
            return Err(Full(value));
        }

        self.free_len -= 1;
        let key = self.free[self.free_len];
        let i = key.as_usize();

        self.entries[i].write(value);
        self.set_bit(i);

        Ok(key)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Pool::capacity(self)
    }
}

impl<T, K: Key> Drop for Pool<T, K> {
    fn drop(&mut self) {
        for i in 0..self.capacity() {
            if self.bit(i) {
                // Safety: occupancy bit set
                unsafe { self.entries[i].assume_init_drop() };
            }
        }
    }
}

impl<T: fmt::Debug, K: Key> fmt::Debug for Pool<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        self.get(key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len()
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: usize) -> &T {
        // Safety: caller guarantees key is occupied
        unsafe { self.get(key).unwrap_unchecked() }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: usize) -> &mut T {
        // Safety: caller guarantees key is occupied
        unsafe { self.get_mut(key).unwrap_unchecked() }
    }

    #[inline]
    unsafe fn remove_unchecked(&mut self, key: usize) -> T {
        self.remove(key)
    }
}

#[cfg(feature = "slab")]
impl<T> UnboundedStorage<T> for slab::Slab<T> {
    #[inline]
    fn insert(&mut self, value: T) -> usize {
        self.insert(value)
    }
}

#[inline]
const fn bitmap_words(capacity: usize) -> usize {
    capacity.div_ceil(64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let pool: Pool<u64> = Pool::with_capacity(16);
        assert!(pool.is_empty());
        assert!(!pool.is_full());
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.capacity(), 16);
    }

    #[test]
    fn capacity_is_exact() {
        let pool: Pool<u64> = Pool::with_capacity(3);
        assert_eq!(pool.capacity(), 3);

        let pool: Pool<u64> = Pool::with_capacity(1000);
        assert_eq!(pool.capacity(), 1000);
    }

    #[test]
    fn insert_get_remove() {
        let mut pool: Pool<u64> = Pool::with_capacity(16);

        let key = pool.try_insert(42).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(key), Some(&42));

        assert_eq!(pool.remove(key), Some(42));
        assert_eq!(pool.get(key), None);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn get_mut() {
        let mut pool: Pool<u64> = Pool::with_capacity(16);

        let key = pool.try_insert(10).unwrap();
        *pool.get_mut(key).unwrap() = 20;

        assert_eq!(pool.get(key), Some(&20));
    }

    #[test]
    fn exhaustion_after_exact_capacity() {
        let mut pool: Pool<u64> = Pool::with_capacity(3);

        let a = pool.try_insert(0).unwrap();
        let b = pool.try_insert(1).unwrap();
        let c = pool.try_insert(2).unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert!(pool.is_full());

        // Fourth insertion reports exhaustion and hands the value back
        let err = pool.try_insert(3);
        assert_eq!(err.unwrap_err().into_inner(), 3);

        // Releasing the first slot makes exactly that slot allocatable again
        assert_eq!(pool.remove(a), Some(0));
        let again = pool.try_insert(9).unwrap();
        assert_eq!(again, a);
    }

    #[test]
    fn lifo_reuse() {
        let mut pool: Pool<u64> = Pool::with_capacity(4);

        let k0 = pool.try_insert(0).unwrap();
        let _k1 = pool.try_insert(1).unwrap();

        pool.remove(k0);

        // Next insert reuses k0's slot (LIFO)
        let k2 = pool.try_insert(2).unwrap();
        assert_eq!(k2, k0);
    }

    #[test]
    fn double_remove_is_a_checked_no_op() {
        let mut pool: Pool<u64> = Pool::with_capacity(16);

        let key = pool.try_insert(42).unwrap();
        assert_eq!(pool.remove(key), Some(42));
        assert_eq!(pool.remove(key), None);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn out_of_range_key() {
        let mut pool: Pool<u64, u32> = Pool::with_capacity(4);
        assert_eq!(pool.get(100), None);
        assert_eq!(pool.remove(100), None);
        assert_eq!(pool.get(u32::NONE), None);
    }

    #[test]
    fn released_slot_allocatable_exactly_once() {
        let mut pool: Pool<u64> = Pool::with_capacity(2);

        let a = pool.try_insert(1).unwrap();
        let _b = pool.try_insert(2).unwrap();

        pool.remove(a);
        assert_eq!(pool.try_insert(3), Ok(a));
        assert!(pool.try_insert(4).is_err());
    }

    #[test]
    fn clear_resets_everything() {
        let mut pool: Pool<u64> = Pool::with_capacity(4);
        let a = pool.try_insert(1).unwrap();
        pool.try_insert(2).unwrap();

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.get(a), None);

        for i in 0..4 {
            pool.try_insert(i).unwrap();
        }
        assert!(pool.is_full());
    }

    #[test]
    fn drop_cleans_up() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct DropCounter;
        impl Drop for DropCounter {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        DROP_COUNT.store(0, Ordering::SeqCst);

        {
            let mut pool: Pool<DropCounter> = Pool::with_capacity(8);
            pool.try_insert(DropCounter).unwrap();
            pool.try_insert(DropCounter).unwrap();
            let k = pool.try_insert(DropCounter).unwrap();
            pool.remove(k);
            assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 1);
        }

        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn u16_keys() {
        let mut pool: Pool<u64, u16> = Pool::with_capacity(100);

        let key = pool.try_insert(42).unwrap();
        assert_eq!(pool.get(key), Some(&42));
    }

    #[cfg(feature = "slab")]
    mod slab_tests {
        use super::*;

        #[test]
        fn insert_get_remove() {
            let mut storage = slab::Slab::new();

            let key = UnboundedStorage::insert(&mut storage, 42u64);
            assert_eq!(Storage::get(&storage, key), Some(&42));

            assert_eq!(Storage::remove(&mut storage, key), Some(42));
            assert_eq!(Storage::get(&storage, key), None);
        }
    }
}
