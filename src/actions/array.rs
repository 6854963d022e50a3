//! Sequence actions
//!
//! Indexed access, slicing and filtering over arrays of rows. Applied to a
//! table or a row set, the result stays bound to that table.

use serde_json::{Map, Value};
use crate::core::context::QueryContext;
use crate::core::errors::{QueryError, Result};
use crate::core::seq;
use crate::core::types::{expect_f64, expect_str, TypeTag};
use crate::core::value::{equals, is_truthy};
use super::object::nth_row;
use super::{arity, expected, resolve_all, ActionRegistry, Argument, RawAction};

pub(crate) fn register(registry: &mut ActionRegistry) -> Result<()> {
    registry.register("nth", arity::ONE, TypeTag::Bracket, RawAction::Unary(nth))?;
    registry.register("slice", arity::ONE_THREE, TypeTag::Sequence, RawAction::Variadic(slice))?;
    registry.register("limit", arity::ONE, TypeTag::Sequence, RawAction::Unary(limit))?;
    registry.register("count", arity::NONE, TypeTag::Datum, RawAction::Nullary(count))?;
    registry.register("offsetsOf", arity::ONE, TypeTag::Datum, RawAction::Unary(offsets_of))?;
    registry.register("filter", arity::ONE, TypeTag::Sequence, RawAction::Unary(filter))?;
    registry.register("orderBy", arity::ONE, TypeTag::Sequence, RawAction::Unary(order_by))?;
    Ok(())
}

fn nth(ctx: &mut QueryContext<'_>, result: Value, index: Argument) -> Result<Value> {
    let index = index.resolve(ctx.db)?;
    nth_row(ctx, &result, &index)
}

fn slice(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let rows = into_sequence(result)?;
    let args = resolve_all(args, ctx.db)?;
    Ok(Value::Array(seq::slice(&rows, args)?))
}

fn limit(ctx: &mut QueryContext<'_>, result: Value, n: Argument) -> Result<Value> {
    let n = expect_f64(&n.resolve(ctx.db)?)?;
    if n < 0.0 {
        return Err(QueryError::Range("LIMIT takes a non-negative argument".to_string()));
    }
    let mut rows = into_sequence(result)?;
    rows.truncate(n as usize);
    Ok(Value::Array(rows))
}

fn count(_ctx: &mut QueryContext<'_>, result: Value) -> Result<Value> {
    match &result {
        Value::Array(rows) => Ok(Value::from(rows.len())),
        Value::Object(object) => Ok(Value::from(object.len())),
        other => Err(expected("ARRAY or OBJECT", other)),
    }
}

fn offsets_of(ctx: &mut QueryContext<'_>, result: Value, needle: Argument) -> Result<Value> {
    let rows = into_sequence(result)?;
    let offsets = match needle {
        Argument::Deferred(predicate) => {
            let mut offsets = Vec::new();
            for (index, row) in rows.iter().enumerate() {
                if is_truthy(&predicate.eval_row(ctx.db, row)?) {
                    offsets.push(index);
                }
            }
            offsets
        }
        needle => seq::offsets_of(&rows, &needle.resolve(ctx.db)?),
    };
    Ok(Value::from(offsets))
}

fn filter(ctx: &mut QueryContext<'_>, result: Value, predicate: Argument) -> Result<Value> {
    let rows = into_sequence(result)?;
    let mut kept = Vec::new();
    match predicate {
        Argument::Deferred(predicate) => {
            for row in rows {
                if is_truthy(&predicate.eval_row(ctx.db, &row)?) {
                    kept.push(row);
                }
            }
        }
        predicate => match predicate.resolve(ctx.db)? {
            Value::Object(fields) => kept.extend(rows.into_iter().filter(|row| matches_fields(row, &fields))),
            constant if is_truthy(&constant) => kept = rows,
            _ => {}
        },
    }
    Ok(Value::Array(kept))
}

/// Every listed field is present on the row and deep-equal to the given value
fn matches_fields(row: &Value, fields: &Map<String, Value>) -> bool {
    fields
        .iter()
        .all(|(key, wanted)| row.get(key).map_or(false, |found| equals(found, wanted)))
}

fn order_by(ctx: &mut QueryContext<'_>, result: Value, field: Argument) -> Result<Value> {
    let field = field.resolve(ctx.db)?;
    let field = expect_str(&field)?;
    let rows = into_sequence(result)?;
    Ok(Value::Array(seq::order_by(&rows, field)?))
}

fn into_sequence(result: Value) -> Result<Vec<Value>> {
    match result {
        Value::Array(rows) => Ok(rows),
        other => Err(expected("ARRAY", &other)),
    }
}
