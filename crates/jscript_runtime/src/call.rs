//! Function invocation and argument assembly.

use crate::error::RuntimeError;
use crate::native::{CallingConvention, NativeCall, NativeSignature, SlotType};
use crate::object::FunctionObject;
use crate::runtime::Runtime;
use crate::value::{ObjectId, PropertyKey, Value};
use jscript_convert::{to_int32, to_uint32, ConversionError};
use jscript_diagnostics::{messages, Diagnostic};
use std::mem;
use std::rc::Rc;
use tracing::warn;

/// What `call` invokes: a value, or a property of the receiver looked up
/// at call time.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Value(Value),
    Member(PropertyKey),
}

impl From<Value> for Callee {
    fn from(value: Value) -> Self {
        Callee::Value(value)
    }
}

impl From<&str> for Callee {
    fn from(name: &str) -> Self {
        Callee::Member(PropertyKey::from(name))
    }
}

impl From<PropertyKey> for Callee {
    fn from(key: PropertyKey) -> Self {
        Callee::Member(key)
    }
}

/// Arguments after convention handling, before the runtime handle is
/// attached.
struct Assembled {
    receiver: Option<Value>,
    args: Vec<Value>,
    rest: Option<Vec<Value>>,
}

impl Runtime {
    /// Call `callee` with `object` as the receiver, or construct with it.
    ///
    /// A nullish receiver becomes the global object. Constructing
    /// allocates an instance linked to the callee's `prototype` and keeps
    /// it unless the callee returns an object of its own.
    pub fn call(
        &mut self,
        object: Value,
        callee: impl Into<Callee>,
        args: Vec<Value>,
        is_construct: bool,
    ) -> Result<Value, RuntimeError> {
        let function = match callee.into() {
            Callee::Value(value) => value,
            Callee::Member(key) => {
                let Value::Object(target) = object else {
                    return Err(ConversionError::NotAnObject { value: self.describe(&object) }.into());
                };
                match self.get_property(target, key.clone())? {
                    Some(value) => value,
                    None => return Err(RuntimeError::NotCallable { value: key.to_string() }),
                }
            }
        };
        let function_id = match &function {
            Value::Object(id) if self.object(*id)?.is_callable() => *id,
            other => return Err(RuntimeError::NotCallable { value: self.describe(other) }),
        };
        if is_construct {
            return self.construct(function_id, args);
        }
        let this = if object.is_nullish() { Value::Object(self.global()) } else { object };
        self.invoke(function_id, this, args)
    }

    /// Call a function value with an explicit receiver.
    pub fn call_value(&mut self, this: Value, function: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        self.call(this, Callee::Value(function), args, false)
    }

    fn construct(&mut self, function: ObjectId, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let constructible = self.object(function)?.function().is_some_and(FunctionObject::is_constructible);
        if !constructible {
            return Err(RuntimeError::NotConstructible { value: self.describe(&Value::Object(function)) });
        }
        let prototype = match self.get_property(function, "prototype")? {
            Some(Value::Object(proto)) => proto,
            _ => self.object_prototype(),
        };
        let instance = self.new_object_with_prototype(Some(prototype));
        let result = self.invoke(function, Value::Object(instance), args)?;
        Ok(if result.is_object() { result } else { Value::Object(instance) })
    }

    fn invoke(&mut self, function: ObjectId, this: Value, mut args: Vec<Value>) -> Result<Value, RuntimeError> {
        let Some(payload) = self.object(function)?.function().cloned() else {
            return Err(RuntimeError::NotCallable { value: self.describe(&Value::Object(function)) });
        };
        match payload {
            FunctionObject::Script(script) => {
                if args.len() < script.params.len() {
                    args.resize(script.params.len(), Value::Missing);
                }
                (script.body)(self, this, args)
            }
            FunctionObject::Host(host) => {
                let assembled = self.assemble(&host.name, &host.signature, this, args)?;
                let call = self.native_call(&host.signature, assembled);
                (host.body)(call)
            }
            FunctionObject::NativeMethod { provider, name, signature } => {
                let assembled = self.assemble(&name, &signature, this, args)?;
                let call = self.native_call(&signature, assembled);
                provider.invoke(&name, call)
            }
        }
    }

    fn native_call(&mut self, signature: &NativeSignature, assembled: Assembled) -> NativeCall<'_> {
        let context = signature.convention.contains(CallingConvention::CONTEXT).then_some(self);
        NativeCall { receiver: assembled.receiver, context, args: assembled.args, rest: assembled.rest }
    }

    /// Shape `args` for a host callable: pad to arity with the missing
    /// sentinel, collect or truncate extras, and coerce typed slots.
    fn assemble(
        &mut self,
        name: &Rc<str>,
        signature: &NativeSignature,
        this: Value,
        mut args: Vec<Value>,
    ) -> Result<Assembled, RuntimeError> {
        let arity = signature.arity();
        let rest = if args.len() > arity {
            if signature.is_variadic() {
                Some(args.split_off(arity))
            } else {
                let extra = args.len() - arity;
                warn!(function = %name, arity, extra, "extra arguments truncated");
                self.report(Diagnostic::new(
                    &messages::EXTRA_ARGUMENTS_TRUNCATED,
                    &[&**name, &arity.to_string(), &extra.to_string()],
                ));
                args.truncate(arity);
                None
            }
        } else {
            signature.is_variadic().then(Vec::new)
        };
        args.resize(arity, Value::Missing);

        if signature.is_typed() {
            for (value, slot) in args.iter_mut().zip(&signature.params) {
                *value = self.coerce_to_slot(mem::take(value), *slot)?;
            }
        }

        let receiver = signature.convention.contains(CallingConvention::RECEIVER).then_some(this);
        Ok(Assembled { receiver, args, rest })
    }

    /// Convert an argument to a host slot type. Missing arguments are left
    /// as the sentinel so the callee can tell them apart.
    fn coerce_to_slot(&mut self, value: Value, slot: SlotType) -> Result<Value, RuntimeError> {
        if value.is_missing() {
            return Ok(value);
        }
        Ok(match slot {
            SlotType::Any => value,
            SlotType::Boolean => Value::Boolean(self.to_boolean(&value)),
            SlotType::Number => Value::Number(self.to_number(&value)?),
            SlotType::Int32 => Value::Number(f64::from(to_int32(self.to_number(&value)?))),
            SlotType::UInt32 => Value::Number(f64::from(to_uint32(self.to_number(&value)?))),
            SlotType::String => Value::String(Rc::from(self.to_string(&value)?)),
            SlotType::Object => {
                if !value.is_object() {
                    return Err(ConversionError::NotAnObject { value: self.describe(&value) }.into());
                }
                value
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::HostFunction;

    #[test]
    fn test_calling_a_primitive_fails() {
        let mut runtime = Runtime::new();
        let err = runtime.call(Value::Undefined, Value::Number(1.0), vec![], false).unwrap_err();
        assert_eq!(err, RuntimeError::NotCallable { value: "1".into() });
    }

    #[test]
    fn test_missing_member_is_not_callable() {
        let mut runtime = Runtime::new();
        let obj = runtime.new_object();
        let err = runtime.call(Value::Object(obj), "nope", vec![], false).unwrap_err();
        assert_eq!(err.message_key(), "not_callable");
    }

    #[test]
    fn test_host_functions_are_not_constructible_by_default() {
        let mut runtime = Runtime::new();
        let f = runtime.new_host_function(HostFunction::new("f", NativeSignature::default(), |_| Ok(Value::Null)));
        let err = runtime.call(Value::Undefined, Value::Object(f), vec![], true).unwrap_err();
        assert_eq!(err, RuntimeError::NotConstructible { value: "f".into() });
    }

    #[test]
    fn test_typed_slots_are_coerced() {
        let mut runtime = Runtime::new();
        let sig = NativeSignature::new(vec![SlotType::Int32, SlotType::String, SlotType::Boolean]);
        let f = runtime.new_host_function(HostFunction::new("f", sig, |call| {
            Ok(match (&call.args[0], &call.args[1], &call.args[2]) {
                (Value::Number(n), Value::String(s), Value::Boolean(b)) => Value::string(&format!("{n}|{s}|{b}")),
                _ => Value::Null,
            })
        }));
        let result = runtime
            .call(Value::Undefined, Value::Object(f), vec![Value::Number(4294967297.0), Value::Number(2.5), Value::string("")], false)
            .unwrap();
        assert_eq!(result, Value::string("1|2.5|false"));
    }
}
