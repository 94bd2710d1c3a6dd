//! Intrusive collections with external storage.
//!
//! This crate provides the container toolkit of latency-critical services:
//! ordered trees, lists, stacks, and queues that never allocate per element.
//! The key insight: separate storage from structure.
//!
//! # Design Philosophy
//!
//! Traditional collections own their data:
//!
//! ```text
//! BTreeSet<T>    - owns values, allocates on insert
//! VecDeque<T>    - owns values, indices unstable on removal
//! LinkedList<T>  - owns nodes, one allocation each
//! ```
//!
//! This crate inverts the model:
//!
//! ```text
//! Storage (Pool)          - owns data, provides stable keys
//! Tree/List/Stack/Queue   - coordinate keys, don't own data
//! ```
//!
//! Benefits:
//! - **Zero allocation on hot path**: Pre-allocate storage at startup
//! - **Stable keys**: Remove from middle without invalidating other keys
//! - **Shared storage**: One pool can feed several containers
//! - **Multi-membership**: An intrusive node sits in a tree and a list at
//!   once, one set of links per membership
//!
//! # Two Forms of Every Container
//!
//! The **intrusive** form ([`Tree`], [`LinkedList`], [`Stack`], [`Queue`])
//! requires the element type to embed its own link keys via a trait
//! ([`TreeLinked`], [`Linked`], [`Chained`]). The container links and
//! unlinks; allocation and freeing stay with the caller. This is the form
//! for objects that belong to several containers simultaneously.
//!
//! The **value-owning** form ([`OrderedSet`], [`Deque`]) wraps plain values
//! in nodes ([`SetNode`], [`ListNode`]) that carry the links, and drives the
//! storage itself: push allocates, pop frees and hands the value back. Use
//! it when the element type cannot be changed.
//!
//! # Quick Start
//!
//! ```
//! use arbor_collections::{OrderedSet, Pool, SetNode};
//!
//! // Storage owns the data (wrapped in SetNode internally)
//! let mut storage: Pool<SetNode<u64>> = Pool::with_capacity(1000);
//!
//! // The set coordinates keys into storage
//! let mut set = OrderedSet::new();
//!
//! set.try_insert(&mut storage, 17u64).unwrap();
//! set.try_insert(&mut storage, 5u64).unwrap();
//! set.try_insert(&mut storage, 17u64).unwrap(); // duplicate, rejected
//!
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.iter(&storage).copied().collect::<Vec<_>>(), vec![5, 17]);
//! ```
//!
//! Or skip the explicit storage with [`OwnedSet`], which bundles its own
//! pool.
//!
//! # Critical Invariant: Same Storage Instance
//!
//! All operations on a container must use the same storage instance. This is
//! the caller's responsibility (same discipline as the `slab` crate).
//! Passing a different storage causes unlinking through foreign keys and
//! panics or silent corruption.
//!
//! # Storage Options
//!
//! | Storage | Capacity | Allocation | Use Case |
//! |---------|----------|------------|----------|
//! | [`Pool`] | Fixed (runtime) | Single heap alloc | Default choice |
//! | `slab::Slab` | Growable | May reallocate | When size unknown |
//!
//! Enable the `slab` feature for the `slab::Slab` backend.
//!
//! # Storage Traits
//!
//! Storage is split into bounded and unbounded variants:
//!
//! ```text
//! Storage<T>           - base trait: get, remove, len
//!     │
//!     ├── BoundedStorage<T>   - fixed capacity, try_insert -> Result
//!     │
//!     └── UnboundedStorage<T> - growable, insert -> Key (infallible)
//! ```
//!
//! This enables different APIs for the value-owning containers:
//! - `try_push`/`try_insert` for bounded storage (returns `Result<_, Full<T>>`)
//! - `push`/`insert` for unbounded storage (infallible)
//!
//! # Data Structures
//!
//! | Structure | Form | Use Case | Key Operations |
//! |-----------|------|----------|----------------|
//! | [`Tree`] | intrusive | ordered indexes, dedup | O(log n) avg insert/find/remove |
//! | [`OrderedSet`] | value-owning | sorted unique values | O(log n) avg insert/find/remove |
//! | [`OwnedSet`] | self-contained | sorted unique values | as `OrderedSet`, pool included |
//! | [`LinkedList`] | intrusive | LRU chains, run queues | O(1) push/pop/remove |
//! | [`Deque`] | value-owning | FIFO queues | O(1) push/pop/remove |
//! | [`Stack`] / [`Queue`] | intrusive | free lists, work queues | O(1) push/pop, single link |
//!
//! [`Tree`] and [`OrderedSet`] are **not** self-balancing: depth follows
//! insertion order, with O(n) worst case. Ordering and uniqueness are
//! defined entirely by a [`Compare`] comparator.
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`

#![warn(missing_docs)]

pub mod chain;
pub mod key;
pub mod linked;
pub mod list;
pub mod owned;
pub mod set;
pub mod storage;
pub mod tree;

pub use chain::{Chained, Queue, Stack};
pub use key::Key;
pub use linked::{Linked, LinkedList};
pub use list::{Deque, ListNode};
pub use owned::OwnedSet;
pub use set::{OrderedSet, SetInsert, SetNode};
pub use storage::{BoundedStorage, Full, Pool, Storage, UnboundedStorage};
pub use tree::{Compare, Natural, Tree, TreeLinked};
