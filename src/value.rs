//! Cell values, value kinds and the cross-kind unification table

use crate::error::{DbdiffError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single row: column name to value, in source column order
pub type Row = IndexMap<String, Value>;

/// A cell value as read from a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Closed set of value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
        };
        f.write_str(name)
    }
}

/// How strictly cells of different kinds are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// Only identical kinds are comparable
    Strict,
    /// Integer and real widen to real, text is parsed against numeric columns,
    /// text and blob compare as bytes
    #[default]
    Numeric,
    /// Every pair of kinds is compared through its canonical text form
    Textual,
}

impl CoercionMode {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "numeric" => Ok(Self::Numeric),
            "textual" => Ok(Self::Textual),
            _ => Err(format!(
                "Invalid coercion mode: {}. Use 'strict', 'numeric', or 'textual'",
                s
            )),
        }
    }
}

impl ValueKind {
    /// Kind that can represent every non-null value in a column holding both kinds.
    /// Mixed columns that are not purely numeric fall back to text.
    pub fn widen(self, other: ValueKind) -> ValueKind {
        use ValueKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, k) | (k, Null) => k,
            (Integer, Real) | (Real, Integer) => Real,
            _ => Text,
        }
    }

    /// Static unification table: the kind both columns are compared in, or
    /// `None` if the pair cannot be compared under `mode`.
    pub fn unify(self, other: ValueKind, mode: CoercionMode) -> Option<ValueKind> {
        use ValueKind::*;
        if self == other {
            return Some(self);
        }
        match (self, other) {
            (Null, k) | (k, Null) => Some(k),
            _ => match mode {
                CoercionMode::Strict => None,
                CoercionMode::Numeric => match (self, other) {
                    (Integer, Real) | (Real, Integer) => Some(Real),
                    (Text, Integer) | (Integer, Text) => Some(Real),
                    (Text, Real) | (Real, Text) => Some(Real),
                    (Text, Blob) | (Blob, Text) => Some(Blob),
                    _ => None,
                },
                CoercionMode::Textual => Some(Text),
            },
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Integer(_) => ValueKind::Integer,
            Self::Real(_) => ValueKind::Real,
            Self::Text(_) => ValueKind::Text,
            Self::Blob(_) => ValueKind::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert into the representation of `target`; `None` when this value
    /// has no faithful form there (e.g. text that is not a number).
    pub fn coerce(&self, target: ValueKind) -> Option<Value> {
        if self.kind() == target {
            return Some(self.clone());
        }
        match (self, target) {
            (Self::Null, _) => Some(Self::Null),
            (Self::Integer(i), ValueKind::Real) => Some(Self::Real(*i as f64)),
            (Self::Text(s), ValueKind::Real) => s.trim().parse::<f64>().ok().map(Self::Real),
            (Self::Text(s), ValueKind::Integer) => s.trim().parse::<i64>().ok().map(Self::Integer),
            (Self::Text(s), ValueKind::Blob) => Some(Self::Blob(s.as_bytes().to_vec())),
            (Self::Blob(b), ValueKind::Text) => Some(Self::Text(
                String::from_utf8(b.clone()).unwrap_or_else(|_| self.to_string()),
            )),
            (value, ValueKind::Text) => Some(Self::Text(value.to_string())),
            _ => None,
        }
    }

    /// Value equality where NaN matches NaN, mirroring null-equals-null
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a == b || (a.is_nan() && b.is_nan()),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// Kind of a whole column: the widening of all its non-null cells
pub fn column_kind<'a>(values: impl IntoIterator<Item = &'a Value>) -> ValueKind {
    values
        .into_iter()
        .fold(ValueKind::Null, |acc, v| acc.widen(v.kind()))
}

/// Resolve the comparison kind for a column, or a recoverable unification error
pub fn unify_column(
    column: &str,
    left: ValueKind,
    right: ValueKind,
    mode: CoercionMode,
) -> Result<ValueKind> {
    left.unify(right, mode)
        .ok_or_else(|| DbdiffError::type_unification(column, left, right))
}
