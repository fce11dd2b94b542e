//! An ordered map and an ordered item tree implemented with an AVL tree
//! over an index arena.
//!
//! [`AvlTree`] keeps items with unique keys sorted and balanced; nodes
//! live in a growable arena and link to each other by index. [`AvlTreeMap`]
//! builds a key-value map on top of it. Both offer in-order, pre-order and
//! post-order iteration, and operations that can fail report an [`Error`]
//! instead of panicking.

mod error;
mod iter;
mod map;
mod tree;

pub use crate::error::{Error, Result};
pub use crate::iter::Iter;
pub use crate::map::{AvlTreeMap, Iter as MapIter};
pub use crate::tree::{AvlTree, KeyOf, SelfKey};
