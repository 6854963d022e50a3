//! Parser for the query language
//!
//! This module turns query strings into [`Term`] trees.

use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;
use serde_json::Value;

use crate::core::errors::{QueryError, Result};
use crate::ql::ast::Term;

#[derive(Parser)]
#[grammar = "ql/grammar.pest"]
pub struct QueryParser;

pub fn parse_query(input: &str) -> Result<Term> {
    let pairs = QueryParser::parse(Rule::main, input)
        .map_err(|e| QueryError::Parse(e.to_string()))?;

    parse_main(pairs)
}

fn parse_main(mut pairs: Pairs<Rule>) -> Result<Term> {
    // `main` contient l'expression suivie de EOI
    let expr = pairs
        .next()
        .and_then(|main| main.into_inner().next())
        .ok_or_else(|| QueryError::Parse("Empty query".to_string()))?;

    parse_expr(expr)
}

fn parse_expr(pair: Pair<Rule>) -> Result<Term> {
    let mut inner = pair.into_inner();
    let primary = inner.next().ok_or_else(|| missing("expression"))?;
    let mut term = parse_primary(primary)?;

    // Chaque suffixe s'applique au terme construit jusqu'ici
    for suffix in inner {
        term = match suffix.as_rule() {
            Rule::method_call => {
                let mut parts = suffix.into_inner();
                let action = parts.next().ok_or_else(|| missing("method name"))?;
                let action = action.as_str().to_string();
                let args = parse_args(parts)?;
                Term::call(action, term, args)
            }
            Rule::bracket_call => Term::call("bracket", term, parse_args(suffix.into_inner())?),
            rule => return Err(unexpected(rule)),
        };
    }

    Ok(term)
}

fn parse_args(pairs: Pairs<Rule>) -> Result<Vec<Term>> {
    pairs.map(parse_expr).collect()
}

fn parse_primary(pair: Pair<Rule>) -> Result<Term> {
    match pair.as_rule() {
        Rule::table => {
            let name = pair.into_inner().next().ok_or_else(|| missing("table name"))?;
            Ok(Term::Table(parse_string(name)?))
        }
        Rule::expr_call => {
            let expr = pair.into_inner().next().ok_or_else(|| missing("expression"))?;
            parse_expr(expr)
        }
        Rule::row => Ok(Term::Row),
        Rule::array => Ok(Term::array(parse_args(pair.into_inner())?)),
        Rule::object => {
            let mut fields = Vec::new();
            for field in pair.into_inner() {
                let mut parts = field.into_inner();
                let key = parts.next().ok_or_else(|| missing("field name"))?;
                let key = match key.as_rule() {
                    Rule::ident => key.as_str().to_string(),
                    _ => parse_string(key)?,
                };
                let value = parts.next().ok_or_else(|| missing("field value"))?;
                fields.push((key, parse_expr(value)?));
            }
            Ok(Term::object(fields))
        }
        Rule::null => Ok(Term::Datum(Value::Null)),
        Rule::boolean => Ok(Term::Datum(Value::Bool(pair.as_str() == "true"))),
        Rule::number => {
            let number = serde_json::from_str::<Value>(pair.as_str())
                .map_err(|_| QueryError::Parse(format!("Invalid number: {}", pair.as_str())))?;
            Ok(Term::Datum(number))
        }
        Rule::double_quoted | Rule::single_quoted => Ok(Term::Datum(Value::String(parse_string(pair)?))),
        rule => Err(unexpected(rule)),
    }
}

/// Decode a quoted string; escapes follow JSON, plus `\'` in single quotes
fn parse_string(pair: Pair<Rule>) -> Result<String> {
    let raw = pair.as_str();
    let json = match pair.as_rule() {
        Rule::double_quoted => raw.to_string(),
        Rule::single_quoted => requote(&raw[1..raw.len() - 1]),
        rule => return Err(unexpected(rule)),
    };
    serde_json::from_str(&json).map_err(|e| QueryError::Parse(format!("Invalid string {}: {}", raw, e)))
}

/// Rewrite the body of a single-quoted string as a JSON string
fn requote(body: &str) -> String {
    let mut json = String::with_capacity(body.len() + 2);
    json.push('"');
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => json.push('\''),
                Some(escaped) => {
                    json.push('\\');
                    json.push(escaped);
                }
                None => json.push_str("\\\\"),
            },
            '"' => json.push_str("\\\""),
            c => json.push(c),
        }
    }
    json.push('"');
    json
}

fn missing(what: &str) -> QueryError {
    QueryError::Parse(format!("Missing {}", what))
}

fn unexpected(rule: Rule) -> QueryError {
    QueryError::Parse(format!("Unexpected rule: {:?}", rule))
}
