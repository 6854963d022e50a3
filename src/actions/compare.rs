//! Comparison actions
//!
//! `eq` and `ne` use deep equality. The orderings chain from the receiver
//! through every argument, so `lt(a, b, c)` means `a < b < c`.

use std::cmp::Ordering;
use serde_json::Value;
use crate::core::context::QueryContext;
use crate::core::errors::Result;
use crate::core::types::TypeTag;
use crate::core::value::{compare, equals};
use super::{arity, resolve_all, ActionRegistry, Argument, RawAction};

pub(crate) fn register(registry: &mut ActionRegistry) -> Result<()> {
    registry.register("eq", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(eq))?;
    registry.register("ne", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(ne))?;
    registry.register("lt", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(lt))?;
    registry.register("le", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(le))?;
    registry.register("gt", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(gt))?;
    registry.register("ge", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(ge))?;
    Ok(())
}

fn eq(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let args = resolve_all(args, ctx.db)?;
    Ok(Value::Bool(args.iter().all(|arg| equals(&result, arg))))
}

fn ne(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let args = resolve_all(args, ctx.db)?;
    Ok(Value::Bool(!args.iter().all(|arg| equals(&result, arg))))
}

fn lt(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    chain(ctx, result, args, |ord| ord == Ordering::Less)
}

fn le(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    chain(ctx, result, args, |ord| ord != Ordering::Greater)
}

fn gt(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    chain(ctx, result, args, |ord| ord == Ordering::Greater)
}

fn ge(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    chain(ctx, result, args, |ord| ord != Ordering::Less)
}

/// Check `holds` on every adjacent pair of `[result, args...]`
fn chain(
    ctx: &mut QueryContext<'_>,
    result: Value,
    args: Vec<Argument>,
    holds: impl Fn(Ordering) -> bool,
) -> Result<Value> {
    let mut previous = result;
    for arg in resolve_all(args, ctx.db)? {
        if !holds(compare(&previous, &arg)) {
            return Ok(Value::Bool(false));
        }
        previous = arg;
    }
    Ok(Value::Bool(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::invoke;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn run(action: &str, result: Value, args: &[Value]) -> Value {
        let mut store = MemoryStore::new();
        let mut ctx = QueryContext::datum(&mut store);
        let args = args.iter().cloned().map(Argument::from).collect();
        invoke(action, &mut ctx, result, args).unwrap()
    }

    #[test]
    fn test_equality() {
        assert_eq!(run("eq", json!({"a": [1]}), &[json!({"a": [1.0]})]), json!(true));
        assert_eq!(run("eq", json!(1), &[json!(1), json!(2)]), json!(false));
        assert_eq!(run("ne", json!("a"), &[json!("b")]), json!(true));
    }

    #[test]
    fn test_chained_orderings() {
        assert_eq!(run("lt", json!(1), &[json!(2), json!(3)]), json!(true));
        assert_eq!(run("lt", json!(1), &[json!(3), json!(2)]), json!(false));
        assert_eq!(run("le", json!(1), &[json!(1)]), json!(true));
        assert_eq!(run("gt", json!("b"), &[json!("a")]), json!(true));
        assert_eq!(run("ge", json!(2), &[json!(3)]), json!(false));
    }

    #[test]
    fn test_cross_kind_ordering() {
        assert_eq!(run("lt", json!([1]), &[json!(true), json!(null), json!(0), json!({}), json!("")]), json!(true));
    }
}
