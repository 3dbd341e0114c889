//! The object arena and late-bound property access.

use crate::error::RuntimeError;
use crate::native::{CallingConvention, HostFunction, NativeMember, NativeMemberProvider, NativeSignature, ScriptFunction};
use crate::object::{CacheEntry, FunctionObject, JsObject, ObjectClass, Slot};
use crate::value::{ObjectId, PropertyKey, Value};
use jscript_convert::{
    array_length, to_boolean, to_number_with, to_string_with, ConversionError, PreferredType,
    Primitive, ToPrimitive,
};
use jscript_core::collections::{FxHashMap, FxHashSet};
use jscript_diagnostics::{Diagnostic, DiagnosticCollection};
use std::rc::Rc;
use tracing::trace;

/// Upper bound on prototype-chain walks.
pub const MAX_PROTOTYPE_CHAIN: usize = 10_000;

/// A realm: the object arena, its root prototypes, the global object and
/// the dynamic scope stack.
#[derive(Debug)]
pub struct Runtime {
    objects: Vec<JsObject>,
    object_prototype: ObjectId,
    function_prototype: ObjectId,
    array_prototype: ObjectId,
    global: ObjectId,
    scopes: Vec<ObjectId>,
    /// Bumped whenever an object serving as a prototype gains or loses a
    /// key, or any prototype link changes.
    epoch: u64,
    method_wrappers: FxHashMap<(ObjectId, Rc<str>), ObjectId>,
    pub(crate) diagnostics: DiagnosticCollection,
    pub(crate) source_name: String,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        let mut objects = Vec::new();
        objects.push(JsObject::new(ObjectClass::Ordinary, None));
        let object_prototype = ObjectId::new(0);
        objects[0].is_prototype = true;

        let mut runtime = Self {
            objects,
            object_prototype,
            function_prototype: object_prototype,
            array_prototype: object_prototype,
            global: object_prototype,
            scopes: Vec::new(),
            epoch: 0,
            method_wrappers: FxHashMap::default(),
            diagnostics: DiagnosticCollection::new(),
            source_name: String::new(),
        };
        runtime.function_prototype = runtime.alloc(ObjectClass::Ordinary, Some(object_prototype));
        runtime.array_prototype = runtime.alloc(ObjectClass::Ordinary, Some(object_prototype));
        runtime.global = runtime.alloc(ObjectClass::Ordinary, Some(object_prototype));
        runtime.install_realm_root();
        runtime
    }

    fn install_realm_root(&mut self) {
        let receiver = NativeSignature::default().with_convention(CallingConvention::RECEIVER);
        let to_string = HostFunction::new(
            "toString",
            receiver.clone().with_convention(CallingConvention::RECEIVER | CallingConvention::CONTEXT),
            |call| {
                let class = match (call.receiver, call.context) {
                    (Some(Value::Object(id)), Some(runtime)) => runtime.object(id)?.class_name().to_string(),
                    _ => "Object".to_string(),
                };
                Ok(Value::String(Rc::from(format!("[object {class}]"))))
            },
        );
        let value_of = HostFunction::new("valueOf", receiver, |call| Ok(call.receiver.unwrap_or_default()));
        let to_string = self.new_host_function(to_string);
        let value_of = self.new_host_function(value_of);
        let root = self.object_prototype;
        self.define_own(root, "toString", Slot::Data(Value::Object(to_string)));
        self.define_own(root, "valueOf", Slot::Data(Value::Object(value_of)));

        let global = self.global;
        self.define_own(global, "undefined", Slot::Data(Value::Undefined));
        self.define_own(global, "NaN", Slot::Data(Value::Number(f64::NAN)));
        self.define_own(global, "Infinity", Slot::Data(Value::Number(f64::INFINITY)));
    }

    // ========================================================================
    // Arena
    // ========================================================================

    fn alloc(&mut self, class: ObjectClass, prototype: Option<ObjectId>) -> ObjectId {
        if let Some(proto) = prototype.and_then(|p| self.objects.get_mut(p.index())) {
            proto.is_prototype = true;
        }
        let id = ObjectId::new(self.objects.len());
        self.objects.push(JsObject::new(class, prototype));
        id
    }

    /// Install a slot during realm setup, before any lookup could have
    /// cached the key.
    fn define_own(&mut self, object: ObjectId, name: &str, slot: Slot) {
        if let Some(obj) = self.objects.get_mut(object.index()) {
            obj.properties.insert(Rc::from(name), slot);
        }
    }

    pub fn object(&self, id: ObjectId) -> Result<&JsObject, RuntimeError> {
        self.objects.get(id.index()).ok_or(RuntimeError::InvalidObject { id })
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut JsObject, RuntimeError> {
        self.objects.get_mut(id.index()).ok_or(RuntimeError::InvalidObject { id })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn global(&self) -> ObjectId {
        self.global
    }

    pub fn object_prototype(&self) -> ObjectId {
        self.object_prototype
    }

    pub fn function_prototype(&self) -> ObjectId {
        self.function_prototype
    }

    pub fn array_prototype(&self) -> ObjectId {
        self.array_prototype
    }

    pub fn new_object(&mut self) -> ObjectId {
        self.alloc(ObjectClass::Ordinary, Some(self.object_prototype))
    }

    pub fn new_object_with_prototype(&mut self, prototype: Option<ObjectId>) -> ObjectId {
        self.alloc(ObjectClass::Ordinary, prototype)
    }

    pub fn new_array(&mut self, values: Vec<Value>) -> ObjectId {
        let id = self.alloc(ObjectClass::Array, Some(self.array_prototype));
        let array = &mut self.objects[id.index()];
        for (index, value) in values.into_iter().enumerate() {
            array.elements.set(index as u32, value);
        }
        id
    }

    pub fn new_native(&mut self, provider: Rc<dyn NativeMemberProvider>) -> ObjectId {
        self.alloc(ObjectClass::Native(provider), Some(self.object_prototype))
    }

    pub fn new_host_function(&mut self, function: HostFunction) -> ObjectId {
        let constructible = function.constructible;
        self.new_function(FunctionObject::Host(function), constructible)
    }

    pub fn new_script_function(&mut self, function: ScriptFunction) -> ObjectId {
        self.new_function(FunctionObject::Script(function), true)
    }

    fn new_function(&mut self, function: FunctionObject, with_prototype: bool) -> ObjectId {
        let id = self.alloc(ObjectClass::Function(function), Some(self.function_prototype));
        if with_prototype {
            let proto = self.new_object();
            self.define_own(proto, "constructor", Slot::Data(Value::Object(id)));
            self.define_own(id, "prototype", Slot::Data(Value::Object(proto)));
        }
        id
    }

    pub fn prototype_of(&self, object: ObjectId) -> Result<Option<ObjectId>, RuntimeError> {
        Ok(self.object(object)?.prototype)
    }

    /// Relink `object` to a new prototype, refusing cycles.
    pub fn set_prototype(&mut self, object: ObjectId, prototype: Option<ObjectId>) -> Result<(), RuntimeError> {
        let mut current = prototype;
        let mut steps = 0;
        while let Some(id) = current {
            if id == object {
                return Err(RuntimeError::PrototypeCycle);
            }
            steps += 1;
            if steps > MAX_PROTOTYPE_CHAIN {
                return Err(RuntimeError::PrototypeChainTooDeep { limit: MAX_PROTOTYPE_CHAIN });
            }
            current = self.object(id)?.prototype;
        }
        if let Some(proto) = prototype {
            self.object_mut(proto)?.is_prototype = true;
        }
        self.object_mut(object)?.prototype = prototype;
        self.bump_epoch();
        Ok(())
    }

    fn bump_epoch(&mut self) {
        self.epoch += 1;
        trace!(epoch = self.epoch, "prototype shape changed");
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Source name stamped on runtime diagnostics.
    pub fn set_source_name(&mut self, name: &str) {
        self.source_name = name.to_string();
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = diagnostic.with_source_name(&self.source_name);
        self.diagnostics.add(diagnostic);
    }

    // ========================================================================
    // Property access
    // ========================================================================

    /// Whether `id` itself owns `key`, counting array elements, array
    /// `length` and host-native members.
    fn owns(&self, id: ObjectId, key: &PropertyKey, name: &str) -> Result<bool, RuntimeError> {
        let obj = self.object(id)?;
        if obj.is_array() {
            if let Some(index) = key.index() {
                return Ok(obj.elements.contains(index));
            }
            if name == "length" {
                return Ok(true);
            }
        }
        if obj.properties.contains_key(name) {
            return Ok(true);
        }
        Ok(obj.native().is_some_and(|provider| provider.member(name).is_some()))
    }

    /// First object on the chain starting at `start` that owns `key`.
    fn find_owner(&self, start: ObjectId, key: &PropertyKey, name: &str) -> Result<Option<ObjectId>, RuntimeError> {
        let mut current = Some(start);
        let mut steps = 0;
        while let Some(id) = current {
            if self.owns(id, key, name)? {
                return Ok(Some(id));
            }
            steps += 1;
            if steps > MAX_PROTOTYPE_CHAIN {
                return Err(RuntimeError::PrototypeChainTooDeep { limit: MAX_PROTOTYPE_CHAIN });
            }
            current = self.object(id)?.prototype;
        }
        Ok(None)
    }

    /// Read `key` from `owner`, which is known to own it. Accessors run
    /// against `receiver`.
    fn read_owned(&mut self, owner: ObjectId, receiver: ObjectId, key: &PropertyKey, name: &Rc<str>) -> Result<Value, RuntimeError> {
        let obj = self.object(owner)?;
        if obj.is_array() {
            if let Some(index) = key.index() {
                return Ok(obj.elements.get(index).cloned().unwrap_or_default());
            }
            if &**name == "length" {
                return Ok(Value::Number(f64::from(obj.length())));
            }
        }
        if let Some(slot) = obj.properties.get(name).cloned() {
            return self.read_slot(slot, receiver);
        }
        let Some(provider) = obj.native().cloned() else {
            return Ok(Value::Undefined);
        };
        match provider.member(name) {
            Some(NativeMember::Field | NativeMember::Accessor) => provider.get_member(name),
            Some(NativeMember::Method(signature)) => {
                Ok(Value::Object(self.method_wrapper(owner, provider, name, signature)))
            }
            None => Ok(Value::Undefined),
        }
    }

    fn read_slot(&mut self, slot: Slot, receiver: ObjectId) -> Result<Value, RuntimeError> {
        match slot {
            Slot::Data(value) => Ok(value),
            Slot::Accessor { getter: Some(getter), .. } => {
                self.call_value(Value::Object(receiver), getter, Vec::new())
            }
            Slot::Accessor { getter: None, .. } => Ok(Value::Undefined),
        }
    }

    /// The callable wrapping a host method; one per owner and name.
    fn method_wrapper(
        &mut self,
        owner: ObjectId,
        provider: Rc<dyn NativeMemberProvider>,
        name: &Rc<str>,
        signature: NativeSignature,
    ) -> ObjectId {
        if let Some(id) = self.method_wrappers.get(&(owner, name.clone())) {
            return *id;
        }
        let function = FunctionObject::NativeMethod { provider, name: name.clone(), signature };
        let id = self.new_function(function, false);
        self.method_wrappers.insert((owner, name.clone()), id);
        id
    }

    /// Read a property through the prototype chain.
    ///
    /// Array elements take the index fast path. Otherwise own slots are
    /// consulted, then the object's resolution cache, then the chain; the
    /// owner found by a walk is cached on `object` itself. Index keys are
    /// never cached.
    pub fn get_property(&mut self, object: ObjectId, key: impl Into<PropertyKey>) -> Result<Option<Value>, RuntimeError> {
        let key = key.into();
        let obj = self.object(object)?;
        if let (true, Some(index)) = (obj.is_array(), key.index()) {
            if let Some(value) = obj.elements.get(index) {
                return Ok(Some(value.clone()));
            }
        }

        let name = key.to_name();
        if let Some(slot) = obj.properties.get(&name).cloned() {
            return self.read_slot(slot, object).map(Some);
        }

        let cacheable = key.index().is_none();
        if cacheable {
            if let Some(entry) = obj.cache.get(&name).copied() {
                if entry.epoch == self.epoch {
                    return match entry.owner {
                        Some(owner) => self.read_owned(owner, object, &key, &name).map(Some),
                        None => Ok(None),
                    };
                }
            }
        }

        let owner = self.find_owner(object, &key, &name)?;
        if cacheable {
            let epoch = self.epoch;
            self.object_mut(object)?.cache.insert(name.clone(), CacheEntry { owner, epoch });
            trace!(object = object.index(), key = %name, owner = ?owner.map(ObjectId::index), "resolution cache filled");
        }
        match owner {
            Some(owner) => self.read_owned(owner, object, &key, &name).map(Some),
            None => Ok(None),
        }
    }

    /// Drop the cache entry for `name` on `object`.
    fn invalidate(&mut self, object: ObjectId, name: &str) -> Result<(), RuntimeError> {
        if self.object_mut(object)?.cache.remove(name).is_some() {
            trace!(object = object.index(), key = %name, "resolution cache invalidated");
        }
        Ok(())
    }

    /// Write a property. Array indices and `length` go to element storage;
    /// accessors (own or inherited) run their setter; host fields are
    /// written through their provider; anything else becomes an own data
    /// slot.
    pub fn set_property(&mut self, object: ObjectId, key: impl Into<PropertyKey>, value: Value) -> Result<(), RuntimeError> {
        let key = key.into();
        let name = key.to_name();
        self.invalidate(object, &name)?;

        if self.object(object)?.is_array() {
            if let Some(index) = key.index() {
                self.object_mut(object)?.elements.set(index, value);
                return Ok(());
            }
            if &*name == "length" {
                let length = array_length(self.to_number(&value)?)?;
                self.object_mut(object)?.elements.set_length(length);
                return Ok(());
            }
        }

        match self.object(object)?.properties.get(&name).cloned() {
            Some(Slot::Data(_)) => {
                if let Some(slot) = self.object_mut(object)?.properties.get_mut(&name) {
                    *slot = Slot::Data(value);
                }
                return Ok(());
            }
            Some(Slot::Accessor { setter, .. }) => return self.run_setter(object, setter, value),
            None => {}
        }

        if let Some(owner) = self.find_owner(object, &key, &name)? {
            let owner_obj = self.object(owner)?;
            if let Some(Slot::Accessor { setter, .. }) = owner_obj.properties.get(&name).cloned() {
                return self.run_setter(object, setter, value);
            }
            if owner == object {
                if let Some(provider) = owner_obj.native().cloned() {
                    provider.set_member(&name, value)?;
                    return Ok(());
                }
            }
        }

        let obj = self.object_mut(object)?;
        obj.properties.insert(name, Slot::Data(value));
        if obj.is_prototype {
            self.bump_epoch();
        }
        Ok(())
    }

    fn run_setter(&mut self, receiver: ObjectId, setter: Option<Value>, value: Value) -> Result<(), RuntimeError> {
        if let Some(setter) = setter {
            self.call_value(Value::Object(receiver), setter, vec![value])?;
        }
        Ok(())
    }

    /// Install an accessor pair as an own slot.
    pub fn define_accessor(
        &mut self,
        object: ObjectId,
        key: impl Into<PropertyKey>,
        getter: Option<Value>,
        setter: Option<Value>,
    ) -> Result<(), RuntimeError> {
        let name = key.into().to_name();
        self.invalidate(object, &name)?;
        let obj = self.object_mut(object)?;
        let added = obj.properties.insert(name, Slot::Accessor { getter, setter }).is_none();
        if added && obj.is_prototype {
            self.bump_epoch();
        }
        Ok(())
    }

    /// Remove an own property. Returns false for properties that cannot be
    /// deleted (array `length`, host members).
    pub fn delete_property(&mut self, object: ObjectId, key: impl Into<PropertyKey>) -> Result<bool, RuntimeError> {
        let key = key.into();
        let name = key.to_name();
        self.invalidate(object, &name)?;

        let obj = self.object_mut(object)?;
        if obj.is_array() {
            if let Some(index) = key.index() {
                obj.elements.remove(index);
                return Ok(true);
            }
            if &*name == "length" {
                return Ok(false);
            }
        }
        if obj.properties.shift_remove(&name).is_some() {
            if obj.is_prototype {
                self.bump_epoch();
            }
            return Ok(true);
        }
        Ok(!obj.native().is_some_and(|provider| provider.member(&name).is_some()))
    }

    pub fn has_property(&self, object: ObjectId, key: impl Into<PropertyKey>) -> Result<bool, RuntimeError> {
        let key = key.into();
        let name = key.to_name();
        Ok(self.find_owner(object, &key, &name)?.is_some())
    }

    pub fn has_own_property(&self, object: ObjectId, key: impl Into<PropertyKey>) -> Result<bool, RuntimeError> {
        let key = key.into();
        let name = key.to_name();
        self.owns(object, &key, &name)
    }

    /// Keys visited by `for-in`: each object's indices in ascending order,
    /// then its named slots in insertion order, walking up the chain and
    /// skipping names already seen.
    pub fn enumerate_keys(&self, object: ObjectId) -> Result<Vec<Rc<str>>, RuntimeError> {
        let mut seen: FxHashSet<Rc<str>> = FxHashSet::default();
        let mut keys = Vec::new();
        let mut current = Some(object);
        let mut steps = 0;
        while let Some(id) = current {
            let obj = self.object(id)?;
            let own = obj
                .elements
                .indices()
                .into_iter()
                .map(|index| Rc::from(index.to_string()))
                .chain(obj.properties.keys().cloned());
            for name in own {
                if seen.insert(name.clone()) {
                    keys.push(name);
                }
            }
            steps += 1;
            if steps > MAX_PROTOTYPE_CHAIN {
                return Err(RuntimeError::PrototypeChainTooDeep { limit: MAX_PROTOTYPE_CHAIN });
            }
            current = obj.prototype;
        }
        // Built-in realm methods are not enumerable.
        keys.retain(|key| !self.is_realm_builtin(object, key));
        Ok(keys)
    }

    fn is_realm_builtin(&self, object: ObjectId, key: &str) -> bool {
        matches!(key, "toString" | "valueOf")
            && self
                .find_owner(object, &PropertyKey::from(key), key)
                .is_ok_and(|owner| owner == Some(self.object_prototype))
    }

    /// `value instanceof constructor`.
    pub fn instance_of(&mut self, value: &Value, constructor: &Value) -> Result<bool, RuntimeError> {
        let ctor = match constructor {
            Value::Object(id) if self.object(*id)?.is_callable() => *id,
            other => return Err(RuntimeError::InvalidInstanceOf { value: self.describe(other) }),
        };
        let Some(Value::Object(prototype)) = self.get_property(ctor, "prototype")? else {
            return Err(RuntimeError::InvalidInstanceOf { value: self.describe(constructor) });
        };
        let Value::Object(object) = value else {
            return Ok(false);
        };
        let mut current = self.object(*object)?.prototype;
        let mut steps = 0;
        while let Some(id) = current {
            if id == prototype {
                return Ok(true);
            }
            steps += 1;
            if steps > MAX_PROTOTYPE_CHAIN {
                return Err(RuntimeError::PrototypeChainTooDeep { limit: MAX_PROTOTYPE_CHAIN });
            }
            current = self.object(id)?.prototype;
        }
        Ok(false)
    }

    // ========================================================================
    // Dynamic scopes
    // ========================================================================

    /// Make `object` the innermost dynamic scope, as `with` does.
    pub fn push_scope(&mut self, object: ObjectId) {
        self.scopes.push(object);
    }

    pub fn pop_scope(&mut self) -> Result<ObjectId, RuntimeError> {
        self.scopes.pop().ok_or(RuntimeError::ScopeUnderflow)
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// The innermost dynamic scope, or the global object.
    pub fn current_scope(&self) -> ObjectId {
        self.scopes.last().copied().unwrap_or(self.global)
    }

    /// Read a late-bound identifier: the innermost scope object that has
    /// it, else the global object.
    pub fn lookup_identifier(&mut self, name: &str) -> Result<Option<Value>, RuntimeError> {
        let target = self.scope_holding(name)?;
        self.get_property(target, name)
    }

    /// Write a late-bound identifier. Names no scope holds land on the
    /// global object.
    pub fn assign_identifier(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let target = self.scope_holding(name)?;
        self.set_property(target, name, value)
    }

    fn scope_holding(&self, name: &str) -> Result<ObjectId, RuntimeError> {
        for scope in self.scopes.iter().rev() {
            if self.has_property(*scope, name)? {
                return Ok(*scope);
            }
        }
        Ok(self.global)
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// `ToPrimitive`. Objects try `valueOf` and `toString` in the order the
    /// hint asks for; the first primitive result wins.
    pub fn to_primitive(&mut self, value: &Value, hint: PreferredType) -> Result<Primitive, RuntimeError> {
        let object = match value {
            Value::Object(id) => *id,
            other => return other.as_primitive().ok_or(ConversionError::NoDefaultValue.into()),
        };
        let order = match hint {
            PreferredType::String => ["toString", "valueOf"],
            PreferredType::Number | PreferredType::Default => ["valueOf", "toString"],
        };
        for method in order {
            let Some(function) = self.get_property(object, method)? else {
                continue;
            };
            if !self.is_callable(&function) {
                continue;
            }
            let result = self.call_value(Value::Object(object), function, Vec::new())?;
            if let Some(primitive) = result.as_primitive() {
                return Ok(primitive);
            }
        }
        Err(ConversionError::NoDefaultValue.into())
    }

    pub fn to_number(&mut self, value: &Value) -> Result<f64, RuntimeError> {
        to_number_with(&mut Coercion { runtime: self, value })
    }

    pub fn to_string(&mut self, value: &Value) -> Result<String, RuntimeError> {
        to_string_with(&mut Coercion { runtime: self, value })
    }

    pub fn to_boolean(&self, value: &Value) -> bool {
        match value.as_primitive() {
            Some(primitive) => to_boolean(&primitive),
            None => true,
        }
    }

    pub fn is_callable(&self, value: &Value) -> bool {
        match value {
            Value::Object(id) => self.object(*id).is_ok_and(JsObject::is_callable),
            _ => false,
        }
    }

    pub fn type_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Object(_) if self.is_callable(value) => "function",
            Value::Object(_) => "object",
            other => other.as_primitive().map_or("undefined", |p| jscript_convert::type_name(&p)),
        }
    }

    /// Short description of a value for error messages.
    pub(crate) fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => match self.object(*id) {
                Ok(obj) => match obj.function() {
                    Some(function) => function.name().to_string(),
                    None => format!("[object {}]", obj.class_name()),
                },
                Err(_) => format!("#{}", id.index()),
            },
            other => other.as_primitive().map(|p| p.to_string()).unwrap_or_default(),
        }
    }
}

/// Adapts a runtime value to the conversion library.
struct Coercion<'r> {
    runtime: &'r mut Runtime,
    value: &'r Value,
}

impl ToPrimitive for Coercion<'_> {
    type Error = RuntimeError;

    fn to_primitive(&mut self, hint: PreferredType) -> Result<Primitive, RuntimeError> {
        self.runtime.to_primitive(self.value, hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_layout() {
        let runtime = Runtime::new();
        let root = runtime.object_prototype();
        assert_eq!(runtime.prototype_of(root).unwrap(), None);
        assert_eq!(runtime.prototype_of(runtime.global()).unwrap(), Some(root));
        assert_eq!(runtime.prototype_of(runtime.array_prototype()).unwrap(), Some(root));
    }

    #[test]
    fn test_own_property_round_trip() {
        let mut runtime = Runtime::new();
        let obj = runtime.new_object();
        runtime.set_property(obj, "a", Value::Number(1.0)).unwrap();
        assert_eq!(runtime.get_property(obj, "a").unwrap(), Some(Value::Number(1.0)));
        assert_eq!(runtime.get_property(obj, "b").unwrap(), None);
    }

    #[test]
    fn test_prototype_cycle_rejected() {
        let mut runtime = Runtime::new();
        let a = runtime.new_object();
        let b = runtime.new_object_with_prototype(Some(a));
        assert_eq!(runtime.set_prototype(a, Some(b)), Err(RuntimeError::PrototypeCycle));
    }

    #[test]
    fn test_default_to_string() {
        let mut runtime = Runtime::new();
        let obj = runtime.new_object();
        assert_eq!(runtime.to_string(&Value::Object(obj)).unwrap(), "[object Object]");
        let array = runtime.new_array(vec![]);
        assert_eq!(runtime.to_string(&Value::Object(array)).unwrap(), "[object Array]");
    }

    #[test]
    fn test_type_of() {
        let mut runtime = Runtime::new();
        let obj = runtime.new_object();
        let f = runtime.new_script_function(ScriptFunction::new("f", &[], |_, _, _| Ok(Value::Undefined)));
        assert_eq!(runtime.type_of(&Value::Object(obj)), "object");
        assert_eq!(runtime.type_of(&Value::Object(f)), "function");
        assert_eq!(runtime.type_of(&Value::Null), "object");
        assert_eq!(runtime.type_of(&Value::Missing), "undefined");
    }
}
