//! Hash collections used throughout the engine.
//!
//! Fx hashing is used everywhere keys are engine-owned (symbols, node ids,
//! property names). Ordered variants preserve insertion order, which matters
//! for property enumeration and for deterministic resolver output.

use std::hash::BuildHasherDefault;

pub use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

/// Insertion-ordered map with Fx hashing.
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Insertion-ordered set with Fx hashing.
pub type FxIndexSet<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;
