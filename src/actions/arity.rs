//! Arity registry
//!
//! Holds the inclusive argument-count range of every action and checks
//! call sites against it before anything is dispatched.

use std::collections::HashMap;
use std::fmt;
use serde::Serialize;
use crate::core::errors::{QueryError, Result};

/// Inclusive argument-count range; `max == None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

pub const NONE: Arity = Arity::new(0, Some(0));
pub const ONE: Arity = Arity::new(1, Some(1));
pub const ONE_PLUS: Arity = Arity::new(1, None);
pub const ONE_TWO: Arity = Arity::new(1, Some(2));
pub const ONE_THREE: Arity = Arity::new(1, Some(3));
pub const TWO: Arity = Arity::new(2, Some(2));

impl Arity {
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Arity { min, max }
    }

    pub fn is_variadic(&self) -> bool {
        self.max.is_none()
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Check `count` against the range, naming `action_id` in the error
    pub fn check(&self, action_id: &str, count: usize) -> Result<()> {
        if self.accepts(count) {
            return Ok(());
        }

        let (bound, n) = match self.max {
            Some(max) if max == self.min => ("exactly", max),
            Some(max) if count > max => ("at most", max),
            _ => ("at least", self.min),
        };
        Err(QueryError::Arity(format!(
            "`{}` takes {} {} argument{}, {} provided",
            action_id,
            bound,
            n,
            if n == 1 { "" } else { "s" },
            count
        )))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{}..={}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

/// Arity ranges keyed by action id
#[derive(Debug, Default)]
pub struct ArityTable {
    ranges: HashMap<String, Arity>,
}

impl ArityTable {
    pub fn new() -> Self {
        ArityTable {
            ranges: HashMap::new(),
        }
    }

    /// Store the range of an action
    pub fn register(&mut self, action_id: &str, arity: Arity) -> Result<()> {
        if arity.max.map_or(false, |max| max < arity.min) {
            return Err(QueryError::Arity(format!(
                "Invalid arity range {}..={:?} for `{}`",
                arity.min, arity.max, action_id
            )));
        }
        self.ranges.insert(action_id.to_string(), arity);
        Ok(())
    }

    pub fn lookup(&self, action_id: &str) -> Option<Arity> {
        self.ranges.get(action_id).copied()
    }

    /// Check an argument count against the registered range
    pub fn validate(&self, action_id: &str, count: usize) -> Result<()> {
        self.lookup(action_id)
            .ok_or_else(|| QueryError::UnknownAction(action_id.to_string()))?
            .check(action_id, count)
    }
}
