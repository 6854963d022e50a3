//! Table actions
//!
//! `get` and `getAll` read rows out of a table and bind the result to them.
//! `insert`, `update`, `replace` and `delete` write back to the live table
//! and return a [`MutationReport`]. Rows handed to a mutation are copies, so
//! every write first finds the live row again by identity.

use log::{debug, warn};
use serde_json::{Map, Value};
use crate::core::context::{same_row, QueryContext};
use crate::core::errors::{QueryError, Result};
use crate::core::report::MutationReport;
use crate::core::types::{expect, expect_str, type_of, TypeTag, ValueKind};
use crate::core::value::{equals, fresh_id, is_valid_key, strict_equals, update_object, PRIMARY_KEY};
use super::{arity, expected, resolve_all, ActionRegistry, Argument, RawAction};

pub(crate) fn register(registry: &mut ActionRegistry) -> Result<()> {
    registry.register("get", arity::ONE, TypeTag::Selection, RawAction::Unary(get))?;
    registry.register("getAll", arity::ONE_PLUS, TypeTag::SelectionArray, RawAction::Variadic(get_all))?;
    registry.register("insert", arity::ONE_TWO, TypeTag::Datum, RawAction::Binary(insert))?;
    registry.register("update", arity::ONE_TWO, TypeTag::Datum, RawAction::Binary(update))?;
    registry.register("replace", arity::ONE_TWO, TypeTag::Datum, RawAction::Binary(replace))?;
    registry.register("delete", arity::NONE, TypeTag::Datum, RawAction::Nullary(delete))?;
    Ok(())
}

const KEY_KINDS: &str = "keys must be either a number, string, bool, pseudotype or array";

fn get(ctx: &mut QueryContext<'_>, table: Value, row_id: Argument) -> Result<Value> {
    ctx.expect_type(TypeTag::Table)?;
    if matches!(row_id, Argument::Undefined) {
        return Err(QueryError::Type("Argument 1 to get may not be `undefined`".to_string()));
    }
    let row_id = row_id.resolve(ctx.db)?;
    if !is_valid_key(&row_id) {
        return Err(QueryError::Identity(format!("Primary {}", KEY_KINDS)));
    }

    let rows = into_rows(table)?;
    let index = rows
        .iter()
        .position(|row| row.get(PRIMARY_KEY).map_or(false, |id| strict_equals(id, &row_id)));
    ctx.row_index = index;
    ctx.row_id = Some(row_id);

    Ok(match index {
        Some(index) => rows.into_iter().nth(index).unwrap_or(Value::Null),
        None => Value::Null,
    })
}

fn get_all(ctx: &mut QueryContext<'_>, table: Value, args: Vec<Argument>) -> Result<Value> {
    ctx.expect_type(TypeTag::Table)?;
    ctx.row_index = None;
    ctx.row_id = None;

    let mut keys = resolve_all(args, ctx.db)?;
    let index = match keys.last() {
        Some(Value::Object(options)) => {
            let index = options.get("index").cloned();
            keys.pop();
            index
        }
        _ => None,
    };
    let index = match index {
        None | Some(Value::Null) => PRIMARY_KEY.to_string(),
        Some(index) => expect_str(&index)?.to_string(),
    };

    for key in &keys {
        if key.is_null() {
            return Err(QueryError::Identity("Keys cannot be NULL".to_string()));
        }
        if !is_valid_key(key) {
            let label = if index == PRIMARY_KEY { "Primary" } else { "Secondary" };
            return Err(QueryError::Identity(format!("{} {}", label, KEY_KINDS)));
        }
    }

    let matched = into_rows(table)?
        .into_iter()
        .filter(|row| match row.get(&index) {
            Some(field) => keys.iter().any(|key| match key {
                Value::Array(_) => equals(key, field),
                _ => strict_equals(key, field),
            }),
            None => false,
        })
        .collect();
    Ok(Value::Array(matched))
}

fn insert(ctx: &mut QueryContext<'_>, _table: Value, rows: Argument, _options: Argument) -> Result<Value> {
    ctx.expect_type(TypeTag::Table)?;
    let rows = match rows.resolve(ctx.db)? {
        Value::Array(rows) => rows,
        row => vec![row],
    };
    for row in &rows {
        expect(row, ValueKind::Object)?;
        if row.get(PRIMARY_KEY).map_or(false, |id| !is_valid_key(id)) {
            return Err(QueryError::Identity(format!("Primary {}", KEY_KINDS)));
        }
    }

    let name = ctx.table_name()?;
    let live = ctx.rows_mut()?;
    let total = rows.len();
    let mut report = MutationReport {
        errors: Some(0),
        ..Default::default()
    };
    let mut generated_keys = Vec::new();

    for row in rows {
        let Value::Object(mut row) = row else { continue };
        match row.get(PRIMARY_KEY) {
            Some(id) => {
                if has_key(live, id) {
                    warn!("Rejected duplicate primary key {} in `{}`", id, name);
                    report.record_error("Duplicate primary key `id`");
                    continue;
                }
            }
            None => {
                let id = fresh_id();
                row.insert(PRIMARY_KEY.to_string(), id.clone());
                generated_keys.push(id);
            }
        }
        live.push(Value::Object(row));
    }

    let inserted = total - report.errors.unwrap_or(0);
    debug!("Inserted {} row(s) into `{}`", inserted, name);
    report.inserted = Some(inserted);
    if !generated_keys.is_empty() {
        report.generated_keys = Some(generated_keys);
    }
    report.into_value()
}

fn update(ctx: &mut QueryContext<'_>, result: Value, patch: Argument, _options: Argument) -> Result<Value> {
    match result {
        Value::Array(rows) => update_rows(ctx, rows, patch),
        row => update_row(ctx, row, patch),
    }
}

fn update_row(ctx: &mut QueryContext<'_>, row: Value, patch: Argument) -> Result<Value> {
    ctx.expect_type(TypeTag::Selection)?;
    if row.is_null() {
        return MutationReport::skipped_update().into_value();
    }

    let patch = into_patch(patch.eval_row(ctx.db, &row)?)?;
    let Some(index) = ctx.locate(&row)? else {
        return MutationReport::skipped_update().into_value();
    };
    let changed = apply_patch(ctx, index, patch)?;
    let report = if changed {
        MutationReport::updated(1, 0)
    } else {
        MutationReport::updated(0, 1)
    };
    report.into_value()
}

fn update_rows(ctx: &mut QueryContext<'_>, rows: Vec<Value>, patch: Argument) -> Result<Value> {
    ctx.expect_selection()?;
    let mut report = MutationReport {
        errors: Some(0),
        ..MutationReport::updated(0, 0)
    };
    if patch.is_null() {
        report.unchanged = Some(rows.len());
    }
    if rows.is_empty() || patch.is_null() {
        return report.into_value();
    }

    // All patches are built before the first write
    let patches = rows
        .iter()
        .map(|row| into_patch(patch.eval_row(ctx.db, row)?))
        .collect::<Result<Vec<_>>>()?;

    let (mut replaced, mut unchanged) = (0, 0);
    for (row, row_patch) in rows.iter().zip(patches) {
        let Some(index) = ctx.locate(row)? else {
            unchanged += 1;
            continue;
        };
        match apply_patch(ctx, index, row_patch) {
            Ok(true) => replaced += 1,
            Ok(false) => unchanged += 1,
            Err(QueryError::Identity(message)) => report.record_error(&message),
            Err(e) => return Err(e),
        }
    }
    debug!("Updated {} of {} row(s)", replaced, rows.len());
    report.replaced = Some(replaced);
    report.unchanged = Some(unchanged);
    report.into_value()
}

fn into_patch(patch: Value) -> Result<Map<String, Value>> {
    match patch {
        Value::Object(patch) => Ok(patch),
        other => Err(expected("type OBJECT", &other)),
    }
}

fn apply_patch(ctx: &mut QueryContext<'_>, index: usize, patch: Map<String, Value>) -> Result<bool> {
    match ctx.rows_mut()?.get_mut(index).and_then(Value::as_object_mut) {
        Some(live) => update_object(live, patch),
        None => Ok(false),
    }
}

fn replace(ctx: &mut QueryContext<'_>, rows: Value, values: Argument, _options: Argument) -> Result<Value> {
    ctx.expect_selection()?;

    if values.is_null() {
        return match rows {
            Value::Null => MutationReport::deleted(0, 1).into_value(),
            Value::Array(rows) => delete_rows(ctx, rows),
            row => delete_row(ctx, row),
        };
    }

    if rows.is_null() {
        let values = values.resolve(ctx.db)?;
        let id = check_replacement(&values)?;
        if has_key(ctx.rows()?, id) {
            warn!("Rejected duplicate primary key {} in `{}`", id, ctx.table_name()?);
            let mut report = MutationReport {
                inserted: Some(0),
                ..Default::default()
            };
            report.record_error("Duplicate primary key `id`");
            return report.into_value();
        }
        ctx.rows_mut()?.push(values);
        debug!("Inserted a replacement row into `{}`", ctx.table_name()?);
        return MutationReport {
            inserted: Some(1),
            ..Default::default()
        }
        .into_value();
    }

    let rows = match rows {
        Value::Array(rows) => rows,
        row => vec![row],
    };
    let mut report = MutationReport {
        errors: Some(0),
        ..Default::default()
    };
    let (mut replaced, mut unchanged) = (0, 0);

    for row in &rows {
        let values = values.eval_row(ctx.db, row)?;
        let new_id = check_replacement(&values)?;
        let same_id = row.get(PRIMARY_KEY).map_or(false, |old| strict_equals(old, new_id));
        if !same_id {
            report.record_error("Primary key `id` cannot be changed");
            continue;
        }
        if equals(row, &values) {
            unchanged += 1;
            continue;
        }
        if let Some(index) = ctx.locate(row)? {
            ctx.rows_mut()?[index] = values;
            replaced += 1;
        }
    }

    report.replaced = Some(replaced);
    report.unchanged = Some(unchanged);
    report.into_value()
}

/// A replacement must be an object carrying a primary key; returns the key
fn check_replacement(values: &Value) -> Result<&Value> {
    let Value::Object(object) = values else {
        return Err(QueryError::Type(format!(
            "Inserted value must be an OBJECT (got {})",
            type_of(values)
        )));
    };
    object
        .get(PRIMARY_KEY)
        .ok_or_else(|| QueryError::Identity("Inserted object must have primary key `id`".to_string()))
}

/// Whether a row of `rows` already carries the primary key `id`
fn has_key(rows: &[Value], id: &Value) -> bool {
    rows.iter()
        .any(|row| row.get(PRIMARY_KEY).map_or(false, |existing| strict_equals(existing, id)))
}

fn delete(ctx: &mut QueryContext<'_>, result: Value) -> Result<Value> {
    match result {
        Value::Array(rows) => delete_rows(ctx, rows),
        row => delete_row(ctx, row),
    }
}

fn delete_row(ctx: &mut QueryContext<'_>, row: Value) -> Result<Value> {
    if row.is_null() {
        return MutationReport::deleted(0, 1).into_value();
    }
    ctx.expect_type(TypeTag::Selection)?;

    let Some(index) = ctx.locate(&row)? else {
        return MutationReport::deleted(0, 1).into_value();
    };
    ctx.rows_mut()?.remove(index);
    ctx.row_index = None;
    debug!("Deleted row {} of `{}`", index, ctx.table_name()?);
    MutationReport::deleted(1, 0).into_value()
}

fn delete_rows(ctx: &mut QueryContext<'_>, rows: Vec<Value>) -> Result<Value> {
    if ctx.ty == TypeTag::Table {
        let live = ctx.rows_mut()?;
        let deleted = live.len();
        live.clear();
        debug!("Truncated `{}` ({} row(s))", ctx.table_name()?, deleted);
        return MutationReport::deleted_rows(deleted).into_value();
    }
    ctx.expect_type(TypeTag::SelectionArray)?;
    if rows.is_empty() {
        return MutationReport::deleted_rows(0).into_value();
    }

    let live = ctx.rows_mut()?;
    let before = live.len();
    live.retain(|existing| !rows.iter().any(|row| same_row(existing, row)));
    let deleted = before - live.len();
    debug!("Deleted {} row(s) from `{}`", deleted, ctx.table_name()?);
    MutationReport::deleted_rows(deleted).into_value()
}

fn into_rows(table: Value) -> Result<Vec<Value>> {
    match table {
        Value::Array(rows) => Ok(rows),
        other => Err(expected("ARRAY", &other)),
    }
}
