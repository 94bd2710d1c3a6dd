//! Containers that bundle their own storage.
//!
//! The core containers borrow storage on every call so that nodes can live
//! in one shared pool across several containers. When that flexibility is
//! not needed, the owned variants pair a container with a private
//! [`Pool`](crate::Pool) and expose a conventional single-object API.

mod set;

pub use set::OwnedSet;
