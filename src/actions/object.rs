//! Object actions
//!
//! Field access, presence tests, deep merge and projection. Each action
//! dispatches on whether the receiver is a single object or an array of
//! objects.

use serde_json::{Map, Value};
use crate::core::context::QueryContext;
use crate::core::errors::{QueryError, Result};
use crate::core::seq;
use crate::core::store::Store;
use crate::core::types::{expect, expect_f64, type_of, TypeTag, ValueKind};
use crate::core::value::{self, field_names, merge_values};
use super::{arity, expected, resolve_all, ActionRegistry, Argument, RawAction};

pub(crate) fn register(registry: &mut ActionRegistry) -> Result<()> {
    registry.register("bracket", arity::ONE, TypeTag::Bracket, RawAction::Unary(bracket))?;
    registry.register("getField", arity::ONE, TypeTag::Datum, RawAction::Unary(get_field))?;
    registry.register("hasFields", arity::ONE_PLUS, TypeTag::Sequence, RawAction::Variadic(has_fields))?;
    registry.register("merge", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(merge))?;
    registry.register("pluck", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(pluck))?;
    registry.register("without", arity::ONE_PLUS, TypeTag::Datum, RawAction::Variadic(without))?;
    Ok(())
}

fn bracket(ctx: &mut QueryContext<'_>, result: Value, key: Argument) -> Result<Value> {
    let key = key.resolve(ctx.db)?;
    match &key {
        Value::Number(_) => nth_row(ctx, &result, &key),
        Value::String(attr) => match &result {
            Value::Array(rows) => Ok(Value::Array(seq::get_field(rows, attr)?)),
            Value::Object(object) => Ok(value::get_field(object, attr)),
            other => Err(expected("ARRAY or OBJECT as first argument to `bracket`", other)),
        },
        other => Err(expected("NUMBER or STRING as second argument to `bracket`", other)),
    }
}

/// Indexed access shared by `bracket` and `nth`
pub(crate) fn nth_row(ctx: &mut QueryContext<'_>, result: &Value, index: &Value) -> Result<Value> {
    let number = expect_f64(index)?;
    if number.fract() != 0.0 {
        return Err(QueryError::Type(format!("Expected type INTEGER but found {}", number)));
    }
    let index = number as i64;
    if index < -1 && ctx.ty.is_stream() {
        return Err(QueryError::Range("Cannot use an index < -1 on a stream".to_string()));
    }

    let rows = result.as_array().ok_or_else(|| expected("ARRAY", result))?;
    let row = seq::nth(rows, index)?;
    let position = if index < 0 { rows.len() as i64 + index } else { index };
    ctx.bind_row(&row, position as usize)?;
    Ok(row)
}

fn get_field(ctx: &mut QueryContext<'_>, result: Value, attr: Argument) -> Result<Value> {
    let attr = attr.resolve(ctx.db)?;
    expect(&attr, ValueKind::String)?;
    let attr = attr.as_str().unwrap_or_default();
    match &result {
        Value::Array(rows) => Ok(Value::Array(seq::get_field(rows, attr)?)),
        Value::Object(object) => Ok(value::get_field(object, attr)),
        other => Err(expected("ARRAY or OBJECT", other)),
    }
}

fn has_fields(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let attrs = field_names(resolve_all(args, ctx.db)?)?;
    match &result {
        Value::Array(rows) => Ok(Value::Array(seq::has_fields(rows, &attrs)?)),
        Value::Object(object) => Ok(Value::Bool(value::has_fields(object, &attrs))),
        other => Err(expected("ARRAY or OBJECT", other)),
    }
}

fn merge(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    match result {
        Value::Array(rows) => rows
            .into_iter()
            .map(|row| {
                expect(&row, ValueKind::Object)?;
                merge_objects(ctx.db, row, &args)
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        object @ Value::Object(_) => merge_objects(ctx.db, object, &args),
        other => Err(expected("ARRAY or OBJECT", &other)),
    }
}

/// Merge every input into a copy of `output`; deferred inputs see the copy
/// as their row
fn merge_objects(db: &mut dyn Store, output: Value, inputs: &[Argument]) -> Result<Value> {
    let mut output = output;
    for input in inputs {
        let input = input.eval_row(db, &output)?;
        output = merge_values(output, input);
    }
    Ok(output)
}

fn pluck(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let fields = field_names(resolve_all(args, ctx.db)?)?;
    project(&result, &fields, seq::pluck, value::pluck)
}

fn without(ctx: &mut QueryContext<'_>, result: Value, args: Vec<Argument>) -> Result<Value> {
    let fields = field_names(resolve_all(args, ctx.db)?)?;
    project(&result, &fields, seq::without, value::without)
}

fn project(
    result: &Value,
    fields: &[String],
    rows_fn: fn(&[Value], &[String]) -> Result<Vec<Value>>,
    object_fn: fn(&Map<String, Value>, &[String]) -> Map<String, Value>,
) -> Result<Value> {
    match result {
        Value::Array(rows) => Ok(Value::Array(rows_fn(rows, fields)?)),
        Value::Object(object) => Ok(Value::Object(object_fn(object, fields))),
        other => Err(QueryError::Type(format!(
            "Expected ARRAY or OBJECT but found {}",
            type_of(other)
        ))),
    }
}
