use serde_json::{json, Value};
use tabletop::{Database, ErrorKind, QueryError};

fn users() -> Database {
    Database::from_fixture(json!({
        "users": [
            {"id": 1, "name": "Alec", "age": 22},
            {"id": 2, "name": "John", "age": 14},
            {"id": 3, "name": "Sam", "age": 18}
        ]
    }))
    .unwrap()
}

fn people() -> Database {
    Database::from_fixture(json!({
        "people": [
            {"id": 1, "name": "Betsy", "gender": "F", "preference": "M"},
            {"id": 2, "name": "Sheila", "gender": "F", "preference": "F"},
            {"id": 3, "name": "Alec", "gender": "M"}
        ]
    }))
    .unwrap()
}

fn names(value: Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_field_arithmetic() {
    let mut db = users();
    assert_eq!(db.run(r#"r.table("users").get(3)("age").sub(2)"#).unwrap(), json!(16));
    assert_eq!(db.run(r#"r.table("users").get(1)("age").add(1, 2)"#).unwrap(), json!(25));
    assert_eq!(db.run(r#"r.table("users").get(2)("age").div(4)"#).unwrap(), json!(3.5));
    assert_eq!(db.run(r#"r.table("users").get(2)("name").add("ny")"#).unwrap(), json!("Johnny"));
}

#[test]
fn test_slice_bounds() {
    let mut db = users();
    assert_eq!(db.run("r.expr([1, 2, 3]).slice(1, 2)").unwrap(), json!([2]));
    assert_eq!(db.run("r.expr([1, 2, 3]).slice(1, 2, {rightBound: 'closed'})").unwrap(), json!([2, 3]));
    assert_eq!(db.run("r.expr([1, 2, 3]).slice(0, 2, {leftBound: 'open'})").unwrap(), json!([2]));
    assert_eq!(db.run("r.expr([1, 2, 3]).slice(-2)").unwrap(), json!([2, 3]));
    assert_eq!(db.run("r.expr([1, 2, 3]).limit(2)").unwrap(), json!([1, 2]));
}

#[test]
fn test_selection_array_chains() {
    let mut db = people();
    let sorted = db.run("r.table('people').orderBy('name')").unwrap();
    assert_eq!(names(sorted), vec!["Alec", "Betsy", "Sheila"]);

    let women = db.run("r.table('people').filter({gender: 'F'})").unwrap();
    assert_eq!(names(women), vec!["Betsy", "Sheila"]);

    let preferences = db.run("r.table('people').getField('preference')").unwrap();
    assert_eq!(preferences, json!(["M", "F"]));

    let with_preference = db.run("r.table('people').hasFields('preference').count()").unwrap();
    assert_eq!(with_preference, json!(2));
}

#[test]
fn test_get_all_by_secondary_index() {
    let mut db = people();
    let women = db.run("r.table('people').getAll('F', {index: 'gender'})").unwrap();
    assert_eq!(names(women), vec!["Betsy", "Sheila"]);

    let by_id = db.run("r.table('people').getAll(3, 1)").unwrap();
    assert_eq!(names(by_id), vec!["Betsy", "Alec"]);

    let err = db.run("r.table('people').getAll(null)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Identity);
}

#[test]
fn test_nth_on_a_stream() {
    let mut db = people();
    assert_eq!(db.run("r.table('people').nth(-1)('name')").unwrap(), json!("Alec"));

    let err = db.run("r.table('people').nth(-2)").unwrap_err();
    assert_eq!(err, QueryError::Range("Cannot use an index < -1 on a stream".to_string()));

    assert_eq!(db.run("r.expr([1, 2, 3]).nth(-2)").unwrap(), json!(2));
}

#[test]
fn test_merge_does_not_touch_the_table() {
    let mut db = users();
    let merged = db.run(r#"r.table("users").get(1).merge({age: 99, tags: ["a"]})"#).unwrap();
    assert_eq!(merged, json!({"id": 1, "name": "Alec", "age": 99, "tags": ["a"]}));
    assert_eq!(db.run(r#"r.table("users").get(1)("age")"#).unwrap(), json!(22));
}

#[test]
fn test_object_shaping() {
    let mut db = users();
    assert_eq!(
        db.run(r#"r.table("users").get(2).pluck("name", "id")"#).unwrap(),
        json!({"id": 2, "name": "John"})
    );
    assert_eq!(
        db.run(r#"r.table("users").get(2).without("age")"#).unwrap(),
        json!({"id": 2, "name": "John"})
    );
    assert_eq!(db.run(r#"r.table("users").get(2)("missing")"#).unwrap(), json!(null));
}

#[test]
fn test_arity_messages() {
    let mut db = users();
    let err = db.run(r#"r.table("users").get()"#).unwrap_err();
    assert_eq!(err.to_string(), "`get` takes exactly 1 argument, 0 provided");

    let err = db.run(r#"r.table("users").get(1)("age").add()"#).unwrap_err();
    assert_eq!(err.to_string(), "`add` takes at least 1 argument, 0 provided");

    let err = db.run(r#"r.table("users").get(1).update({a: 1}, {}, {})"#).unwrap_err();
    assert_eq!(err.to_string(), "`update` takes at most 2 arguments, 3 provided");

    let err = db.run(r#"r.table("users").get(1).delete(1)"#).unwrap_err();
    assert_eq!(err.to_string(), "`delete` takes exactly 0 arguments, 1 provided");
}
