//! Core containers and memory primitives of `svec`.
//!
//! - [`mem::Buffer`] owns one raw block of `capacity` slots and knows nothing about which slots are live.
//! - [`collections::DynArr`] is a growable contiguous array built on top of a single `Buffer`.

pub mod mem;
pub mod collections;
pub mod prelude;
