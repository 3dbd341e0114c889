//! Late-binding runtime tests: prototype lookups, the resolution cache,
//! host-native members and argument assembly.

use jscript_runtime::{
    CallingConvention, HostFunction, NativeCall, NativeMember, NativeMemberProvider,
    NativeSignature, Runtime, RuntimeError, ScriptFunction, SlotType, Value,
};
use std::cell::Cell;
use std::rc::Rc;

/// A host type with a field, a computed accessor and two methods.
#[derive(Debug)]
struct Counter {
    count: Cell<f64>,
}

impl NativeMemberProvider for Counter {
    fn type_name(&self) -> &str {
        "Counter"
    }

    fn member(&self, name: &str) -> Option<NativeMember> {
        match name {
            "count" => Some(NativeMember::Field),
            "doubled" => Some(NativeMember::Accessor),
            "add" => Some(NativeMember::Method(NativeSignature::new(vec![SlotType::Number]))),
            "addAll" => Some(NativeMember::Method(
                NativeSignature::default().with_convention(CallingConvention::VARIADIC),
            )),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value, RuntimeError> {
        match name {
            "count" => Ok(Value::Number(self.count.get())),
            "doubled" => Ok(Value::Number(self.count.get() * 2.0)),
            _ => Ok(Value::Undefined),
        }
    }

    fn set_member(&self, name: &str, value: Value) -> Result<bool, RuntimeError> {
        match (name, value) {
            ("count", Value::Number(n)) => {
                self.count.set(n);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn invoke(&self, name: &str, call: NativeCall<'_>) -> Result<Value, RuntimeError> {
        match name {
            "add" => {
                let Value::Number(n) = call.arg(0) else {
                    return Err(RuntimeError::host("add expects a number"));
                };
                self.count.set(self.count.get() + n);
                Ok(Value::Number(self.count.get()))
            }
            "addAll" => {
                for value in call.rest.unwrap_or_default() {
                    if let Value::Number(n) = value {
                        self.count.set(self.count.get() + n);
                    }
                }
                Ok(Value::Number(self.count.get()))
            }
            _ => Err(RuntimeError::host(format!("no method {name}"))),
        }
    }
}

fn counter(runtime: &mut Runtime, start: f64) -> (jscript_runtime::ObjectId, Rc<Counter>) {
    let provider = Rc::new(Counter { count: Cell::new(start) });
    let id = runtime.new_native(provider.clone());
    (id, provider)
}

fn chain(runtime: &mut Runtime) -> [jscript_runtime::ObjectId; 3] {
    let grandparent = runtime.new_object();
    let parent = runtime.new_object_with_prototype(Some(grandparent));
    let child = runtime.new_object_with_prototype(Some(parent));
    [grandparent, parent, child]
}

// ============================================================================
// Resolution cache
// ============================================================================

#[test]
fn test_cache_filled_on_original_object() {
    let mut runtime = Runtime::new();
    let [grandparent, parent, child] = chain(&mut runtime);
    runtime.set_property(grandparent, "k", Value::string("gp")).unwrap();

    assert_eq!(runtime.get_property(child, "k").unwrap(), Some(Value::string("gp")));

    let entry = runtime.object(child).unwrap().cached("k").copied().unwrap();
    assert_eq!(entry.owner, Some(grandparent));
    assert!(runtime.object(parent).unwrap().cached("k").is_none());
}

#[test]
fn test_own_write_beats_cached_ancestor() {
    let mut runtime = Runtime::new();
    let [grandparent, _, child] = chain(&mut runtime);
    runtime.set_property(grandparent, "x", Value::Number(1.0)).unwrap();
    assert_eq!(runtime.get_property(child, "x").unwrap(), Some(Value::Number(1.0)));

    runtime.set_property(child, "x", Value::Number(2.0)).unwrap();

    assert!(runtime.object(child).unwrap().cached("x").is_none());
    assert_eq!(runtime.get_property(child, "x").unwrap(), Some(Value::Number(2.0)));
}

#[test]
fn test_shadowing_in_intermediate_prototype() {
    let mut runtime = Runtime::new();
    let [grandparent, parent, child] = chain(&mut runtime);
    runtime.set_property(grandparent, "x", Value::Number(1.0)).unwrap();
    assert_eq!(runtime.get_property(child, "x").unwrap(), Some(Value::Number(1.0)));

    runtime.set_property(parent, "x", Value::Number(3.0)).unwrap();
    assert_eq!(runtime.get_property(child, "x").unwrap(), Some(Value::Number(3.0)));
}

#[test]
fn test_negative_entry_refreshed_when_ancestor_gains_key() {
    let mut runtime = Runtime::new();
    let [grandparent, _, child] = chain(&mut runtime);
    assert_eq!(runtime.get_property(child, "late").unwrap(), None);
    assert_eq!(runtime.object(child).unwrap().cached("late").unwrap().owner, None);

    runtime.set_property(grandparent, "late", Value::Boolean(true)).unwrap();
    assert_eq!(runtime.get_property(child, "late").unwrap(), Some(Value::Boolean(true)));
}

#[test]
fn test_delete_falls_back_to_ancestor() {
    let mut runtime = Runtime::new();
    let [grandparent, _, child] = chain(&mut runtime);
    runtime.set_property(grandparent, "x", Value::Number(1.0)).unwrap();
    runtime.set_property(child, "x", Value::Number(2.0)).unwrap();

    assert!(runtime.delete_property(child, "x").unwrap());
    assert_eq!(runtime.get_property(child, "x").unwrap(), Some(Value::Number(1.0)));

    assert!(runtime.delete_property(grandparent, "x").unwrap());
    assert_eq!(runtime.get_property(child, "x").unwrap(), None);
}

#[test]
fn test_array_indices_never_cached() {
    let mut runtime = Runtime::new();
    let array = runtime.new_array(vec![Value::Number(10.0)]);
    let proto = runtime.array_prototype();
    runtime.set_property(proto, "5", Value::string("inherited")).unwrap();

    assert_eq!(runtime.get_property(array, 0u32).unwrap(), Some(Value::Number(10.0)));
    assert_eq!(runtime.get_property(array, "5").unwrap(), Some(Value::string("inherited")));
    assert_eq!(runtime.object(array).unwrap().cache_len(), 0);
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_array_length_tracks_writes() {
    let mut runtime = Runtime::new();
    let array = runtime.new_array(vec![Value::Null, Value::Null]);
    runtime.set_property(array, "9", Value::Boolean(true)).unwrap();
    assert_eq!(runtime.get_property(array, "length").unwrap(), Some(Value::Number(10.0)));

    runtime.set_property(array, "length", Value::Number(1.0)).unwrap();
    assert_eq!(runtime.get_property(array, "9").unwrap(), None);
    assert_eq!(runtime.enumerate_keys(array).unwrap(), vec![Rc::<str>::from("0")]);
}

#[test]
fn test_invalid_array_length() {
    let mut runtime = Runtime::new();
    let array = runtime.new_array(vec![]);
    let err = runtime.set_property(array, "length", Value::Number(-1.0)).unwrap_err();
    assert_eq!(err.message_key(), "invalid_array_length");
    assert!(!runtime.delete_property(array, "length").unwrap());
}

// ============================================================================
// Enumeration, instanceof and accessors
// ============================================================================

#[test]
fn test_enumerate_keys_walks_chain_in_order() {
    let mut runtime = Runtime::new();
    let [grandparent, parent, child] = chain(&mut runtime);
    runtime.set_property(grandparent, "a", Value::Null).unwrap();
    runtime.set_property(parent, "b", Value::Null).unwrap();
    runtime.set_property(child, "c", Value::Null).unwrap();
    runtime.set_property(child, "a", Value::Null).unwrap();

    let keys: Vec<String> = runtime.enumerate_keys(child).unwrap().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["c", "a", "b"]);
}

#[test]
fn test_instance_of() {
    let mut runtime = Runtime::new();
    let ctor = runtime.new_script_function(ScriptFunction::new("Point", &[], |_, _, _| Ok(Value::Undefined)));
    let instance = runtime.call(Value::Undefined, Value::Object(ctor), vec![], true).unwrap();
    let plain = Value::Object(runtime.new_object());

    assert!(runtime.instance_of(&instance, &Value::Object(ctor)).unwrap());
    assert!(!runtime.instance_of(&plain, &Value::Object(ctor)).unwrap());
    assert!(!runtime.instance_of(&Value::Number(1.0), &Value::Object(ctor)).unwrap());
    assert_eq!(
        runtime.instance_of(&plain, &Value::Null).unwrap_err().message_key(),
        "invalid_instanceof"
    );
}

#[test]
fn test_inherited_accessor_runs_against_receiver() {
    let mut runtime = Runtime::new();
    let [grandparent, _, child] = chain(&mut runtime);
    let getter = runtime.new_script_function(ScriptFunction::new("get", &[], |rt, this, _| {
        let Value::Object(id) = this else {
            return Ok(Value::Undefined);
        };
        Ok(rt.get_property(id, "raw")?.unwrap_or_default())
    }));
    runtime
        .define_accessor(grandparent, "value", Some(Value::Object(getter)), None)
        .unwrap();
    runtime.set_property(child, "raw", Value::Number(7.0)).unwrap();

    assert_eq!(runtime.get_property(child, "value").unwrap(), Some(Value::Number(7.0)));
}

// ============================================================================
// Host-native members
// ============================================================================

#[test]
fn test_native_field_and_accessor() {
    let mut runtime = Runtime::new();
    let (id, provider) = counter(&mut runtime, 2.0);

    assert_eq!(runtime.get_property(id, "count").unwrap(), Some(Value::Number(2.0)));
    assert_eq!(runtime.get_property(id, "doubled").unwrap(), Some(Value::Number(4.0)));

    runtime.set_property(id, "count", Value::Number(5.0)).unwrap();
    assert_eq!(provider.count.get(), 5.0);
    assert!(runtime.object(id).unwrap().own_slot("count").is_none());
    assert!(!runtime.delete_property(id, "count").unwrap());
}

#[test]
fn test_native_members_found_through_chain() {
    let mut runtime = Runtime::new();
    let (native, _) = counter(&mut runtime, 1.0);
    let derived = runtime.new_object_with_prototype(Some(native));

    assert_eq!(runtime.get_property(derived, "doubled").unwrap(), Some(Value::Number(2.0)));
    assert_eq!(runtime.object(derived).unwrap().cached("doubled").unwrap().owner, Some(native));
}

#[test]
fn test_native_method_is_wrapped_once() {
    let mut runtime = Runtime::new();
    let (id, _) = counter(&mut runtime, 0.0);
    let first = runtime.get_property(id, "add").unwrap().unwrap();
    let second = runtime.get_property(id, "add").unwrap().unwrap();
    assert_eq!(first, second);
    assert!(runtime.is_callable(&first));
}

#[test]
fn test_native_method_coerces_arguments() {
    let mut runtime = Runtime::new();
    let (id, provider) = counter(&mut runtime, 1.0);
    let result = runtime.call(Value::Object(id), "add", vec![Value::string("41")], false).unwrap();
    assert_eq!(result, Value::Number(42.0));
    assert_eq!(provider.count.get(), 42.0);
}

#[test]
fn test_extra_arguments_truncated_with_warning() {
    let mut runtime = Runtime::new();
    runtime.set_source_name("page.js");
    let (id, _) = counter(&mut runtime, 0.0);
    let result = runtime
        .call(Value::Object(id), "add", vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)], false)
        .unwrap();
    assert_eq!(result, Value::Number(1.0));

    let diagnostics = runtime.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.warning_count(), 1);
    let warning = &diagnostics.diagnostics()[0];
    assert_eq!(warning.message_key, "extra_arguments_truncated");
    assert_eq!(warning.source_name, "page.js");
    assert_eq!(warning.message, "'add' accepts 1 argument(s); 2 extra argument(s) ignored.");
}

#[test]
fn test_variadic_method_collects_extras() {
    let mut runtime = Runtime::new();
    let (id, _) = counter(&mut runtime, 0.0);
    let args = vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)];
    assert_eq!(runtime.call(Value::Object(id), "addAll", args, false).unwrap(), Value::Number(6.0));
    assert!(runtime.diagnostics().is_empty());
}

#[test]
fn test_native_method_not_constructible() {
    let mut runtime = Runtime::new();
    let (id, _) = counter(&mut runtime, 0.0);
    let err = runtime.call(Value::Object(id), "add", vec![], true).unwrap_err();
    assert_eq!(err.message_key(), "not_constructible");
}

// ============================================================================
// Argument assembly
// ============================================================================

#[test]
fn test_missing_arguments_padded_with_sentinel() {
    let mut runtime = Runtime::new();
    let sig = NativeSignature::new(vec![SlotType::Any, SlotType::Number]);
    let f = runtime.new_host_function(HostFunction::new("pair", sig, |call| {
        assert_eq!(call.args.len(), 2);
        Ok(Value::Boolean(call.args[1].is_missing()))
    }));
    let result = runtime.call(Value::Undefined, Value::Object(f), vec![Value::Null], false).unwrap();
    assert_eq!(result, Value::Boolean(true));
}

#[test]
fn test_script_functions_receive_everything_uncoerced() {
    let mut runtime = Runtime::new();
    let f = runtime.new_script_function(ScriptFunction::new("f", &["a", "b"], |_, _, args| {
        Ok(Value::Number(args.len() as f64))
    }));
    let padded = runtime.call(Value::Undefined, Value::Object(f), vec![Value::string("1")], false).unwrap();
    assert_eq!(padded, Value::Number(2.0));

    let many = vec![Value::Null, Value::Null, Value::Null, Value::Null];
    let all = runtime.call(Value::Undefined, Value::Object(f), many, false).unwrap();
    assert_eq!(all, Value::Number(4.0));
    assert!(runtime.diagnostics().is_empty());
}

#[test]
fn test_receiver_and_context_conventions() {
    let mut runtime = Runtime::new();
    let sig = NativeSignature::default()
        .with_convention(CallingConvention::RECEIVER | CallingConvention::CONTEXT);
    let f = runtime.new_host_function(HostFunction::new("tag", sig, |call| {
        let (Some(Value::Object(this)), Some(rt)) = (call.receiver, call.context) else {
            return Err(RuntimeError::host("missing receiver or context"));
        };
        rt.set_property(this, "tagged", Value::Boolean(true))?;
        Ok(Value::Undefined)
    }));
    let obj = runtime.new_object();
    runtime.set_property(obj, "tag", Value::Object(f)).unwrap();
    runtime.call(Value::Object(obj), "tag", vec![], false).unwrap();
    assert_eq!(runtime.get_property(obj, "tagged").unwrap(), Some(Value::Boolean(true)));
}

#[test]
fn test_nullish_receiver_becomes_global() {
    let mut runtime = Runtime::new();
    let sig = NativeSignature::default().with_convention(CallingConvention::RECEIVER);
    let f = runtime.new_host_function(HostFunction::new("self", sig, |call| Ok(call.receiver.unwrap_or_default())));
    let result = runtime.call(Value::Undefined, Value::Object(f), vec![], false).unwrap();
    assert_eq!(result, Value::Object(runtime.global()));
}

#[test]
fn test_constructor_returning_object_wins() {
    let mut runtime = Runtime::new();
    let other = runtime.new_object();
    let ctor = runtime.new_script_function(ScriptFunction::new("Make", &[], move |_, _, _| Ok(Value::Object(other))));
    let made = runtime.call(Value::Undefined, Value::Object(ctor), vec![], true).unwrap();
    assert_eq!(made, Value::Object(other));
}

// ============================================================================
// Conversions and dynamic scopes
// ============================================================================

#[test]
fn test_to_primitive_uses_value_of() {
    let mut runtime = Runtime::new();
    let obj = runtime.new_object();
    let value_of = runtime.new_script_function(ScriptFunction::new("valueOf", &[], |_, _, _| Ok(Value::Number(42.0))));
    runtime.set_property(obj, "valueOf", Value::Object(value_of)).unwrap();

    assert_eq!(runtime.to_number(&Value::Object(obj)).unwrap(), 42.0);
    assert_eq!(runtime.to_string(&Value::Object(obj)).unwrap(), "[object Object]");
}

#[test]
fn test_to_primitive_without_primitive_result() {
    let mut runtime = Runtime::new();
    let obj = runtime.new_object();
    let returns_self = runtime.new_script_function(ScriptFunction::new("m", &[], |_, this, _| Ok(this)));
    runtime.set_property(obj, "valueOf", Value::Object(returns_self)).unwrap();
    runtime.set_property(obj, "toString", Value::Object(returns_self)).unwrap();

    let err = runtime.to_number(&Value::Object(obj)).unwrap_err();
    assert_eq!(err.message_key(), "no_default_value");
}

#[test]
fn test_dynamic_scope_lookup() {
    let mut runtime = Runtime::new();
    let global = runtime.global();
    runtime.set_property(global, "x", Value::Number(1.0)).unwrap();
    let scope = runtime.new_object();
    runtime.set_property(scope, "x", Value::Number(2.0)).unwrap();

    runtime.push_scope(scope);
    assert_eq!(runtime.lookup_identifier("x").unwrap(), Some(Value::Number(2.0)));
    runtime.assign_identifier("x", Value::Number(3.0)).unwrap();
    runtime.assign_identifier("fresh", Value::Null).unwrap();
    assert_eq!(runtime.pop_scope().unwrap(), scope);

    assert_eq!(runtime.lookup_identifier("x").unwrap(), Some(Value::Number(1.0)));
    assert_eq!(runtime.get_property(scope, "x").unwrap(), Some(Value::Number(3.0)));
    assert_eq!(runtime.get_property(global, "fresh").unwrap(), Some(Value::Null));
    assert_eq!(runtime.pop_scope(), Err(RuntimeError::ScopeUnderflow));
}

#[test]
fn test_global_constants() {
    let mut runtime = Runtime::new();
    let nan = runtime.lookup_identifier("NaN").unwrap();
    assert!(matches!(nan, Some(Value::Number(n)) if n.is_nan()));
    assert_eq!(runtime.lookup_identifier("undefined").unwrap(), Some(Value::Undefined));
    assert_eq!(runtime.lookup_identifier("nothing").unwrap(), None);
}
