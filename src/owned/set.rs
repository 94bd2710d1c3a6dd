use crate::set::{Iter, IterRev};
use crate::tree::{Compare, Natural};
use crate::{Full, OrderedSet, Pool, SetInsert, SetNode};

/// An ordered set with a built-in fixed-capacity pool.
///
/// Bundles an [`OrderedSet`] with the [`Pool`] that holds its nodes, so each
/// call site no longer threads the storage through. Capacity is fixed at
/// construction; insertion into a full set fails with [`Full`].
///
/// # Example
///
/// ```
/// use arbor_collections::OwnedSet;
///
/// let mut set: OwnedSet<u64> = OwnedSet::with_capacity(1024);
///
/// set.try_insert(17).unwrap();
/// set.try_insert(5).unwrap();
/// set.try_insert(17).unwrap(); // duplicate, rejected
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![5, 17]);
/// assert_eq!(set.remove(&17), Some(17));
/// ```
#[derive(Debug)]
pub struct OwnedSet<T, C = Natural> {
    pool: Pool<SetNode<T>>,
    set: OrderedSet<T, u32, C>,
}

impl<T: Ord> OwnedSet<T, Natural> {
    /// Creates an empty set ordered by `T: Ord`, with room for `capacity`
    /// values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
            set: OrderedSet::new(),
        }
    }
}

impl<T, C: Compare<T>> OwnedSet<T, C> {
    /// Creates an empty set bound to the given comparator, with room for
    /// `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
            set: OrderedSet::with_comparator(cmp),
        }
    }

    /// Returns the number of values in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Returns `true` if no more values fit.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    /// Inserts a value; see [`OrderedSet::try_insert`].
    #[inline]
    pub fn try_insert(&mut self, value: T) -> Result<SetInsert<u32, T>, Full<T>> {
        self.set.try_insert(&mut self.pool, value)
    }

    /// Finds the key of the value comparing equal to `probe`.
    #[inline]
    pub fn find(&self, probe: &T) -> Option<u32> {
        self.set.find(&self.pool, probe)
    }

    /// Returns `true` if a value compares equal to `probe`.
    #[inline]
    pub fn contains(&self, probe: &T) -> bool {
        self.set.contains(&self.pool, probe)
    }

    /// Returns a reference to the value at `key`.
    #[inline]
    pub fn get(&self, key: u32) -> Option<&T> {
        self.set.get(&self.pool, key)
    }

    /// Removes the value comparing equal to `probe`, returning it.
    #[inline]
    pub fn remove(&mut self, probe: &T) -> Option<T> {
        self.set.remove(&mut self.pool, probe)
    }

    /// Returns a reference to the smallest value.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.set.first(&self.pool)
    }

    /// Returns a reference to the largest value.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.set.last(&self.pool)
    }

    /// Removes every value.
    #[inline]
    pub fn clear(&mut self) {
        self.set.clear(&mut self.pool);
    }

    /// Returns an iterator over value references in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, Pool<SetNode<T>>, u32> {
        self.set.iter(&self.pool)
    }

    /// Returns an iterator over value references in descending order.
    #[inline]
    pub fn iter_rev(&self) -> IterRev<'_, T, Pool<SetNode<T>>, u32> {
        self.set.iter_rev(&self.pool)
    }
}
