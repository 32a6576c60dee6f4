//! Filter expressions handed to the find and count operations.
//!
//! User filters travel as [`Filter::Raw`] and are only interpreted by the
//! data source. Cursor positions are expressed with [`Filter::Compare`] and
//! intersected into whatever filter the caller supplied.

use crate::source::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Filter passed through from the caller as-is.
    Raw(Value),
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    /// Intersect two filters, flattening nested conjunctions.
    pub fn and(self, other: Filter) -> Self {
        let mut filters = match self {
            Self::And(filters) => filters,
            filter => vec![filter],
        };
        match other {
            Self::And(other) => filters.extend(other),
            other => filters.push(other),
        }
        Self::And(filters)
    }

    /// Narrow an optional existing filter with an additional constraint.
    pub fn intersect(existing: Option<Filter>, constraint: Filter) -> Self {
        match existing {
            Some(existing) => existing.and(constraint),
            None => constraint,
        }
    }

    /// Evaluate the filter against a record held in memory.
    ///
    /// A raw filter is read as an object of field equalities, `null` places no
    /// constraint, and any other raw value matches nothing.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Raw(Value::Null) => true,
            Self::Raw(Value::Object(fields)) => fields
                .iter()
                .all(|(field, expected)| record.get(field) == Some(expected)),
            Self::Raw(_) => false,
            Self::Compare { field, op, value } => {
                let actual = record.get(field).unwrap_or(&Value::Null);
                op.holds(compare_values(actual, value))
            }
            Self::And(filters) => filters.iter().all(|f| f.matches(record)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(record)),
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: values of different types order by type
/// (`null` first), values of the same scalar type by their natural order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(a, b)| compare_values(a, b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
