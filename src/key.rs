//! Sentinel-based key trait for storage indices.
//!
//! Containers in this crate never hold pointers; they hold keys into a
//! [`Storage`](crate::Storage). A reserved sentinel value (e.g. `u32::MAX`)
//! stands in for "no key", so link fields cost exactly one integer instead
//! of an `Option<Idx>`.

/// A copyable index type with a sentinel "none" value.
///
/// `from_usize` and `as_usize` must be exact inverses for every valid key:
/// `Key::from_usize(k.as_usize()) == k`. The sentinel is never a valid slot
/// index.
///
/// # Example
///
/// ```
/// use arbor_collections::Key;
///
/// let key: u32 = 5;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// ```
///
/// # Custom key types
///
/// Strongly-typed keys (order ids, task ids) can implement `Key` directly:
///
/// ```
/// use arbor_collections::Key;
///
/// #[derive(Copy, Clone, PartialEq, Eq)]
/// struct TaskId(u32);
///
/// impl Key for TaskId {
///     const NONE: Self = TaskId(u32::MAX);
///
///     fn from_usize(val: usize) -> Self {
///         TaskId(val as u32)
///     }
///
///     fn as_usize(self) -> usize {
///         self.0 as usize
///     }
/// }
/// ```
pub trait Key: Copy + Eq {
    /// Sentinel value representing "no key" / null.
    ///
    /// Used for empty links in containers. For integer types this is `MAX`.
    const NONE: Self;

    /// Creates a key from a slot index.
    fn from_usize(val: usize) -> Self;

    /// Returns the key as a slot index.
    fn as_usize(self) -> usize;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is not the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }
}

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_key_sentinel {
        ($($ty:ty => $name:ident),*) => {
            $(
                #[test]
                fn $name() {
                    assert!(<$ty>::NONE.is_none());
                    assert!(!<$ty>::NONE.is_some());
                    assert!((0 as $ty).is_some());
                    assert!((<$ty>::MAX - 1).is_some());
                }
            )*
        };
    }

    test_key_sentinel!(
        u8 => u8_sentinel,
        u16 => u16_sentinel,
        u32 => u32_sentinel,
        u64 => u64_sentinel,
        usize => usize_sentinel
    );

    #[test]
    fn from_usize_roundtrip() {
        for i in [0usize, 1, 100, 1000, u16::MAX as usize] {
            let key = u32::from_usize(i);
            assert_eq!(key.as_usize(), i);
        }
    }
}
