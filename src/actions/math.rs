//! Math actions
//!
//! `add` is polymorphic over numbers, strings and arrays; `sub`, `mul` and
//! `div` only fold numbers. All of them fold left to right starting from
//! the receiver.

use serde_json::Value;
use crate::core::context::QueryContext;
use crate::core::errors::Result;
use crate::core::types::{expect, expect_f64, ValueKind};
use crate::core::value::number;
use crate::core::TypeTag;
use super::{arity, expected, resolve_all, ActionRegistry, Argument, RawAction};

pub(crate) fn register(registry: &mut ActionRegistry) -> Result<()> {
    registry.register("add", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(add))?;
    registry.register("sub", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(sub))?;
    registry.register("mul", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(mul))?;
    registry.register("div", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(div))?;
    Ok(())
}

fn add(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let kind = ValueKind::of(&result);
    if !matches!(kind, ValueKind::Array | ValueKind::Number | ValueKind::String) {
        return Err(expected("type ARRAY, NUMBER, or STRING", &result));
    }

    let args = resolve_all(args, ctx.db)?;
    for arg in &args {
        expect(arg, kind)?;
    }

    match result {
        Value::Array(mut total) => {
            for arg in args {
                if let Value::Array(items) = arg {
                    total.extend(items);
                }
            }
            Ok(Value::Array(total))
        }
        Value::String(mut total) => {
            for arg in &args {
                total.push_str(arg.as_str().unwrap_or_default());
            }
            Ok(Value::String(total))
        }
        other => fold_numbers(&other, &args, |total, n| total + n),
    }
}

fn sub(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let args = resolve_all(args, ctx.db)?;
    fold_numbers(&result, &args, |total, n| total - n)
}

fn mul(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let args = resolve_all(args, ctx.db)?;
    fold_numbers(&result, &args, |total, n| total * n)
}

fn div(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let args = resolve_all(args, ctx.db)?;
    fold_numbers(&result, &args, |total, n| total / n)
}

fn fold_numbers(result: &Value, args: &[Value], op: impl Fn(f64, f64) -> f64) -> Result<Value> {
    let mut total = expect_f64(result)?;
    for arg in args {
        total = op(total, expect_f64(arg)?);
    }
    number(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::invoke;
    use crate::core::errors::QueryError;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn run(action: &str, result: Value, args: &[Value]) -> Result<Value> {
        let mut store = MemoryStore::new();
        let mut ctx = QueryContext::datum(&mut store);
        let args = args.iter().cloned().map(Argument::from).collect();
        invoke(action, &mut ctx, result, args)
    }

    #[test]
    fn test_add() {
        assert_eq!(run("add", json!(18), &[json!(2)]).unwrap(), json!(20));
        assert_eq!(run("add", json!(1), &[json!(2), json!(0.5)]).unwrap(), json!(3.5));
        assert_eq!(run("add", json!("a"), &[json!("b"), json!("c")]).unwrap(), json!("abc"));
        assert_eq!(run("add", json!([1]), &[json!([2]), json!([3, 4])]).unwrap(), json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_add_type_errors() {
        assert_eq!(
            run("add", json!(true), &[json!(1)]).unwrap_err(),
            QueryError::Type("Expected type ARRAY, NUMBER, or STRING but found BOOL".into())
        );
        assert_eq!(
            run("add", json!(1), &[json!("1")]).unwrap_err(),
            QueryError::Type("Expected type NUMBER but found STRING".into())
        );
    }

    #[test]
    fn test_numeric_folds() {
        assert_eq!(run("sub", json!(18), &[json!(2)]).unwrap(), json!(16));
        assert_eq!(run("mul", json!(18), &[json!(2)]).unwrap(), json!(36));
        assert_eq!(run("div", json!(18), &[json!(2)]).unwrap(), json!(9));
        assert_eq!(run("sub", json!(10), &[json!(1), json!(2), json!(3)]).unwrap(), json!(4));
        assert_eq!(run("div", json!(1), &[json!(4)]).unwrap(), json!(0.25));
    }

    #[test]
    fn test_numeric_errors() {
        assert!(matches!(run("sub", json!("a"), &[json!(1)]), Err(QueryError::Type(_))));
        assert!(matches!(run("mul", json!(1), &[json!([1])]), Err(QueryError::Type(_))));
        assert!(matches!(run("div", json!(1), &[json!(0)]), Err(QueryError::Range(_))));
    }
}
