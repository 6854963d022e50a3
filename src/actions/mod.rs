//! Action registry
//!
//! Every operation a query can chain (`get`, `update`, `add`, `pluck`...)
//! is registered here once, with its arity range, its declared result type
//! and a wrapped callable. The registry is built on first use and is
//! read-only afterwards.

pub mod arity;
pub mod math;
pub mod object;
pub mod table;
pub mod array;
pub mod compare;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;

use log::{debug, trace};
use serde_json::Value;

use crate::core::context::QueryContext;
use crate::core::errors::{QueryError, Result};
use crate::core::store::Store;
use crate::core::types::{type_of, TypeTag};
use arity::{Arity, ArityTable};

type DeferredFn = dyn Fn(&mut dyn Store, Option<&Value>) -> Result<Value>;

/// A query fragment evaluated later, against a specific row
#[derive(Clone)]
pub struct Deferred(Rc<DeferredFn>);

impl Deferred {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Store, Option<&Value>) -> Result<Value> + 'static,
    {
        Deferred(Rc::new(f))
    }

    /// Evaluate with `row` bound as the current row
    pub fn eval_row(&self, db: &mut dyn Store, row: &Value) -> Result<Value> {
        trace!("Evaluating deferred expression against a row");
        (self.0)(db, Some(row))
    }

    /// Evaluate without binding a new row
    pub fn run(&self, db: &mut dyn Store) -> Result<Value> {
        (self.0)(db, None)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// An argument handed to an action
#[derive(Debug, Clone)]
pub enum Argument {
    /// Position not supplied by the caller
    Undefined,
    Datum(Value),
    Deferred(Deferred),
}

impl Argument {
    pub fn is_null(&self) -> bool {
        matches!(self, Argument::Datum(Value::Null))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Argument::Deferred(_))
    }

    pub fn as_datum(&self) -> Option<&Value> {
        match self {
            Argument::Datum(value) => Some(value),
            _ => None,
        }
    }

    /// Turn the argument into a value, running it if it is deferred
    pub fn resolve(self, db: &mut dyn Store) -> Result<Value> {
        match self {
            Argument::Datum(value) => Ok(value),
            Argument::Deferred(deferred) => deferred.run(db),
            Argument::Undefined => Err(QueryError::Type("Argument may not be `undefined`".to_string())),
        }
    }

    /// Value of the argument for one row; plain data ignores the row
    pub fn eval_row(&self, db: &mut dyn Store, row: &Value) -> Result<Value> {
        match self {
            Argument::Datum(value) => Ok(value.clone()),
            Argument::Deferred(deferred) => deferred.eval_row(db, row),
            Argument::Undefined => Err(QueryError::Type("Argument may not be `undefined`".to_string())),
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Datum(value)
    }
}

/// Resolve every argument in order
pub fn resolve_all(args: Vec<Argument>, db: &mut dyn Store) -> Result<Vec<Value>> {
    args.into_iter().map(|arg| arg.resolve(db)).collect()
}

pub type NullaryFn = fn(&mut QueryContext<'_>, Value) -> Result<Value>;
pub type UnaryFn = fn(&mut QueryContext<'_>, Value, Argument) -> Result<Value>;
pub type BinaryFn = fn(&mut QueryContext<'_>, Value, Argument, Argument) -> Result<Value>;
pub type VariadicFn = fn(&mut QueryContext<'_>, Value, Vec<Argument>) -> Result<Value>;

/// Raw action implementation, shaped by how many positional arguments it takes
#[derive(Clone, Copy)]
pub enum RawAction {
    Nullary(NullaryFn),
    Unary(UnaryFn),
    Binary(BinaryFn),
    Variadic(VariadicFn),
}

/// An action callable with a uniform argument list
#[derive(Clone, Copy)]
pub struct WrappedAction {
    raw: RawAction,
}

/// Wrap `raw` so it can be called with a plain argument list.
///
/// The declared maximum arity picks the shape: 0 passes no arguments, 1 the
/// first, 2 the first two, anything else the whole list.
pub fn wrap_action(action_id: &str, arity: Arity, raw: RawAction) -> Result<WrappedAction> {
    let consistent = match (arity.max, raw) {
        (Some(0), RawAction::Nullary(_)) => true,
        (Some(1), RawAction::Unary(_)) => true,
        (Some(2), RawAction::Binary(_)) => true,
        (Some(0..=2), _) => false,
        (_, RawAction::Variadic(_)) => true,
        _ => false,
    };
    if !consistent {
        return Err(QueryError::Arity(format!(
            "Implementation of `{}` does not match its arity {}",
            action_id, arity
        )));
    }
    Ok(WrappedAction { raw })
}

impl WrappedAction {
    pub fn call(&self, ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
        match self.raw {
            RawAction::Nullary(f) => f(ctx, result),
            RawAction::Unary(f) => {
                let first = args.into_iter().next().unwrap_or(Argument::Undefined);
                f(ctx, result, first)
            }
            RawAction::Binary(f) => {
                let mut args = args.into_iter();
                let first = args.next().unwrap_or(Argument::Undefined);
                let second = args.next().unwrap_or(Argument::Undefined);
                f(ctx, result, first, second)
            }
            RawAction::Variadic(f) => f(ctx, result, args),
        }
    }
}

/// Registered action: arity range, declared type and callable
#[derive(Clone, Copy)]
pub struct ActionDescriptor {
    pub arity: Arity,
    pub ty: TypeTag,
    pub action: WrappedAction,
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("arity", &self.arity)
            .field("ty", &self.ty)
            .finish()
    }
}

/// All known actions, keyed by id
#[derive(Default)]
pub struct ActionRegistry {
    arities: ArityTable,
    actions: HashMap<String, ActionDescriptor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        ActionRegistry::default()
    }

    /// Registry holding every built-in action
    pub fn builtin() -> Result<Self> {
        let mut registry = ActionRegistry::new();
        registry.register("typeOf", arity::NONE, TypeTag::Datum, RawAction::Nullary(type_of_action))?;
        math::register(&mut registry)?;
        compare::register(&mut registry)?;
        object::register(&mut registry)?;
        array::register(&mut registry)?;
        table::register(&mut registry)?;
        Ok(registry)
    }

    pub fn register(&mut self, action_id: &str, arity: Arity, ty: TypeTag, raw: RawAction) -> Result<()> {
        self.arities.register(action_id, arity)?;
        let action = wrap_action(action_id, arity, raw)?;
        self.actions.insert(action_id.to_string(), ActionDescriptor { arity, ty, action });
        Ok(())
    }

    pub fn describe(&self, action_id: &str) -> Result<&ActionDescriptor> {
        self.actions
            .get(action_id)
            .ok_or_else(|| QueryError::UnknownAction(action_id.to_string()))
    }

    /// Validate the argument count, then dispatch
    pub fn invoke(
        &self,
        action_id: &str,
        ctx: &mut QueryContext<'_>,
        result: Value,
        args: Vec<Argument>,
    ) -> Result<Value> {
        let descriptor = self.describe(action_id)?;
        self.arities.validate(action_id, args.len())?;
        debug!("Dispatching `{}` with {} argument(s) on {}", action_id, args.len(), ctx.ty);
        descriptor.action.call(ctx, result, args)
    }

    /// Ids of every registered action, sorted
    pub fn action_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

static REGISTRY: OnceLock<ActionRegistry> = OnceLock::new();

/// The process-wide registry of built-in actions
pub fn registry() -> &'static ActionRegistry {
    REGISTRY.get_or_init(|| match ActionRegistry::builtin() {
        Ok(registry) => registry,
        // Only reachable if a built-in was declared with the wrong shape.
        Err(e) => panic!("built-in action table is inconsistent: {}", e),
    })
}

/// Arity and declared type of a built-in action
pub fn describe(action_id: &str) -> Result<&'static ActionDescriptor> {
    registry().describe(action_id)
}

/// Validate and run a built-in action
pub fn invoke(action_id: &str, ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    registry().invoke(action_id, ctx, result, args)
}

fn type_of_action(_ctx: &mut QueryContext<'_>, result: Value) -> Result<Value> {
    Ok(Value::String(type_of(&result).to_string()))
}

/// Type error naming the accepted kinds and the kind found
pub(crate) fn expected(accepted: &str, found: &Value) -> QueryError {
    QueryError::Type(format!("Expected {} but found {}", accepted, type_of(found)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn first(_ctx: &mut QueryContext<'_>, _result: Value, arg: Argument) -> Result<Value> {
        arg.as_datum().cloned().ok_or_else(|| QueryError::Type("missing".into()))
    }

    fn pair(_ctx: &mut QueryContext<'_>, _result: Value, a: Argument, b: Argument) -> Result<Value> {
        Ok(json!([a.as_datum().cloned(), matches!(b, Argument::Undefined)]))
    }

    fn all(_ctx: &mut QueryContext<'_>, _result: Value, args: Vec<Argument>) -> Result<Value> {
        Ok(json!(args.len()))
    }

    fn args(values: &[Value]) -> Vec<Argument> {
        values.iter().cloned().map(Argument::from).collect()
    }

    #[test]
    fn test_wrapper_unpacks_by_max_arity() {
        let mut store = MemoryStore::new();
        let mut ctx = QueryContext::datum(&mut store);

        let unary = wrap_action("first", arity::ONE, RawAction::Unary(first)).unwrap();
        assert_eq!(unary.call(&mut ctx, json!(null), args(&[json!(7)])).unwrap(), json!(7));

        let binary = wrap_action("pair", arity::ONE_TWO, RawAction::Binary(pair)).unwrap();
        assert_eq!(binary.call(&mut ctx, json!(null), args(&[json!(1)])).unwrap(), json!([1, true]));

        let variadic = wrap_action("all", arity::ONE_PLUS, RawAction::Variadic(all)).unwrap();
        assert_eq!(variadic.call(&mut ctx, json!(null), args(&[json!(1), json!(2), json!(3)])).unwrap(), json!(3));

        let three = wrap_action("all", arity::ONE_THREE, RawAction::Variadic(all)).unwrap();
        assert_eq!(three.call(&mut ctx, json!(null), args(&[json!(1), json!(2)])).unwrap(), json!(2));
    }

    #[test]
    fn test_wrapper_rejects_mismatched_shape() {
        assert!(wrap_action("first", arity::ONE_PLUS, RawAction::Unary(first)).is_err());
        assert!(wrap_action("all", arity::ONE, RawAction::Variadic(all)).is_err());
        assert!(wrap_action("pair", arity::ONE, RawAction::Binary(pair)).is_err());
    }

    #[test]
    fn test_builtins_are_consistent() {
        let registry = ActionRegistry::builtin().unwrap();
        for id in registry.action_ids() {
            let descriptor = registry.describe(id).unwrap();
            assert!(descriptor.arity.max.map_or(true, |max| descriptor.arity.min <= max), "{}", id);
        }
        assert_eq!(describe("get").unwrap().ty, TypeTag::Selection);
        assert_eq!(describe("getAll").unwrap().ty, TypeTag::SelectionArray);
        assert_eq!(describe("bracket").unwrap().ty, TypeTag::Bracket);
        assert_eq!(describe("hasFields").unwrap().ty, TypeTag::Sequence);
        assert_eq!(describe("delete").unwrap().arity, arity::NONE);
        assert_eq!(describe("insert").unwrap().arity, arity::ONE_TWO);
    }

    #[test]
    fn test_invoke_validates_arity_first() {
        let mut store = MemoryStore::new();
        let mut ctx = QueryContext::datum(&mut store);
        let err = invoke("getField", &mut ctx, json!({"a": 1}), vec![]).unwrap_err();
        assert_eq!(err.to_string(), "`getField` takes exactly 1 argument, 0 provided");

        let err = invoke("add", &mut ctx, json!(1), vec![]).unwrap_err();
        assert_eq!(err.to_string(), "`add` takes at least 1 argument, 0 provided");

        let err = invoke("nope", &mut ctx, json!(1), vec![]).unwrap_err();
        assert!(matches!(err, QueryError::UnknownAction(_)));
    }

    #[test]
    fn test_type_of() {
        let mut store = MemoryStore::new();
        let mut ctx = QueryContext::datum(&mut store);
        assert_eq!(invoke("typeOf", &mut ctx, json!([1]), vec![]).unwrap(), json!("ARRAY"));
    }

    #[test]
    fn test_argument_resolution() {
        let mut store = MemoryStore::new();
        let deferred = Argument::Deferred(Deferred::new(|_, row| {
            Ok(row.and_then(|row| row.get("a")).cloned().unwrap_or(Value::Null))
        }));
        assert_eq!(deferred.eval_row(&mut store, &json!({"a": 5})).unwrap(), json!(5));
        assert_eq!(deferred.clone().resolve(&mut store).unwrap(), json!(null));
        assert!(Argument::Undefined.resolve(&mut store).is_err());
        assert!(Argument::from(json!(null)).is_null());
    }
}
