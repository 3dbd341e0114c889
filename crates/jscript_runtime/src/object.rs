//! Object storage: property slots, array elements and the resolution
//! cache.

use crate::native::{HostFunction, NativeMemberProvider, NativeSignature, ScriptFunction};
use crate::value::{ObjectId, Value};
use jscript_core::collections::{FxHashMap, FxIndexMap};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Writes this far past the end of the dense part still extend it; writes
/// further out go to the sparse map.
const MAX_DENSE_GAP: u32 = 64;

/// A named property slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Data(Value),
    Accessor { getter: Option<Value>, setter: Option<Value> },
}

/// The callable payload of a function object.
#[derive(Clone)]
pub enum FunctionObject {
    Script(ScriptFunction),
    Host(HostFunction),
    /// A host method, wrapped when a lookup first reaches it.
    NativeMethod { provider: Rc<dyn NativeMemberProvider>, name: Rc<str>, signature: NativeSignature },
}

impl FunctionObject {
    pub fn name(&self) -> &str {
        match self {
            FunctionObject::Script(f) => &f.name,
            FunctionObject::Host(f) => &f.name,
            FunctionObject::NativeMethod { name, .. } => name,
        }
    }

    pub fn is_constructible(&self) -> bool {
        match self {
            FunctionObject::Script(_) => true,
            FunctionObject::Host(f) => f.constructible,
            FunctionObject::NativeMethod { .. } => false,
        }
    }
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionObject::Script(func) => func.fmt(f),
            FunctionObject::Host(func) => func.fmt(f),
            FunctionObject::NativeMethod { provider, name, signature } => f
                .debug_struct("NativeMethod")
                .field("type", &provider.type_name())
                .field("name", name)
                .field("signature", signature)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ObjectClass {
    Ordinary,
    Array,
    Function(FunctionObject),
    Native(Rc<dyn NativeMemberProvider>),
}

/// Memo of which object on the prototype chain owns a key. `owner: None`
/// records that no object does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub owner: Option<ObjectId>,
    /// Prototype-shape epoch the entry was filled under.
    pub epoch: u64,
}

// ============================================================================
// Elements
// ============================================================================

/// Indexed storage of an array: a dense prefix with holes plus a sparse
/// map for far-out indices.
#[derive(Debug, Clone, Default)]
pub(crate) struct Elements {
    dense: Vec<Option<Value>>,
    sparse: BTreeMap<u32, Value>,
    length: u32,
}

impl Elements {
    pub(crate) fn length(&self) -> u32 {
        self.length
    }

    pub(crate) fn get(&self, index: u32) -> Option<&Value> {
        match self.dense.get(index as usize) {
            Some(slot) => slot.as_ref(),
            None => self.sparse.get(&index),
        }
    }

    pub(crate) fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    pub(crate) fn set(&mut self, index: u32, value: Value) {
        let dense_len = self.dense.len() as u32;
        if index < dense_len {
            self.dense[index as usize] = Some(value);
        } else if index - dense_len <= MAX_DENSE_GAP {
            self.dense.resize(index as usize, None);
            self.dense.push(Some(value));
            self.absorb_sparse();
        } else {
            self.sparse.insert(index, value);
        }
        if index >= self.length {
            self.length = index + 1;
        }
    }

    pub(crate) fn remove(&mut self, index: u32) -> bool {
        match self.dense.get_mut(index as usize) {
            Some(slot) => slot.take().is_some(),
            None => self.sparse.remove(&index).is_some(),
        }
    }

    /// Set `length`, dropping every element at or past it.
    pub(crate) fn set_length(&mut self, length: u32) {
        if (length as usize) < self.dense.len() {
            self.dense.truncate(length as usize);
        }
        self.sparse.retain(|index, _| *index < length);
        self.length = length;
    }

    /// Present indices in ascending order.
    pub(crate) fn indices(&self) -> Vec<u32> {
        let dense = self
            .dense
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| i as u32);
        dense.chain(self.sparse.keys().copied()).collect()
    }

    fn absorb_sparse(&mut self) {
        while let Some(value) = self.sparse.remove(&(self.dense.len() as u32)) {
            self.dense.push(Some(value));
        }
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Debug, Clone)]
pub struct JsObject {
    pub(crate) class: ObjectClass,
    pub(crate) prototype: Option<ObjectId>,
    pub(crate) properties: FxIndexMap<Rc<str>, Slot>,
    pub(crate) elements: Elements,
    pub(crate) cache: FxHashMap<Rc<str>, CacheEntry>,
    /// Set once any object links to this one as its prototype.
    pub(crate) is_prototype: bool,
}

impl JsObject {
    pub(crate) fn new(class: ObjectClass, prototype: Option<ObjectId>) -> Self {
        Self {
            class,
            prototype,
            properties: FxIndexMap::default(),
            elements: Elements::default(),
            cache: FxHashMap::default(),
            is_prototype: false,
        }
    }

    pub fn class(&self) -> &ObjectClass {
        &self.class
    }

    pub fn prototype(&self) -> Option<ObjectId> {
        self.prototype
    }

    pub fn is_array(&self) -> bool {
        matches!(self.class, ObjectClass::Array)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.class, ObjectClass::Function(_))
    }

    pub fn function(&self) -> Option<&FunctionObject> {
        match &self.class {
            ObjectClass::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn native(&self) -> Option<&Rc<dyn NativeMemberProvider>> {
        match &self.class {
            ObjectClass::Native(provider) => Some(provider),
            _ => None,
        }
    }

    /// Name shown by the default `toString`.
    pub fn class_name(&self) -> &str {
        match &self.class {
            ObjectClass::Ordinary => "Object",
            ObjectClass::Array => "Array",
            ObjectClass::Function(_) => "Function",
            ObjectClass::Native(provider) => provider.type_name(),
        }
    }

    pub fn own_slot(&self, name: &str) -> Option<&Slot> {
        self.properties.get(name)
    }

    /// Array `length`; zero for non-arrays.
    pub fn length(&self) -> u32 {
        self.elements.length()
    }

    pub fn cached(&self, name: &str) -> Option<&CacheEntry> {
        self.cache.get(name)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_writes_extend_length() {
        let mut elements = Elements::default();
        elements.set(0, Value::Number(1.0));
        elements.set(2, Value::Number(3.0));
        assert_eq!(elements.length(), 3);
        assert!(elements.get(1).is_none());
        assert_eq!(elements.indices(), vec![0, 2]);
    }

    #[test]
    fn test_far_writes_go_sparse() {
        let mut elements = Elements::default();
        elements.set(1_000_000, Value::Boolean(true));
        assert_eq!(elements.length(), 1_000_001);
        assert_eq!(elements.get(1_000_000), Some(&Value::Boolean(true)));
        assert_eq!(elements.indices(), vec![1_000_000]);
    }

    #[test]
    fn test_set_length_truncates_both_parts() {
        let mut elements = Elements::default();
        elements.set(0, Value::Null);
        elements.set(5, Value::Null);
        elements.set(500, Value::Null);
        elements.set_length(3);
        assert_eq!(elements.length(), 3);
        assert_eq!(elements.indices(), vec![0]);
    }

    #[test]
    fn test_remove_leaves_hole() {
        let mut elements = Elements::default();
        elements.set(0, Value::Null);
        elements.set(1, Value::Null);
        assert!(elements.remove(0));
        assert!(!elements.remove(0));
        assert_eq!(elements.length(), 2);
        assert!(!elements.contains(0));
    }
}
