//! Schema module: maps filter field keys onto columns of the records table.
//!
//! This module provides the TableRef and FieldMapping types and a builder for custom mappings.
//! Schema, table and column names are spliced into SQL unquoted, so every way of building
//! them, deserialization included, checks that they are plain identifiers.

use crate::config::{DEFAULT_SCHEMA_NAME, DEFAULT_TABLE_NAME};
use crate::RecfilterError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn check_identifier(what: &str, name: &str) -> Result<(), RecfilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RecfilterError::InvalidConfig(format!(
            "{what} {name:?} is not a valid SQL identifier"
        )))
    }
}

/// A schema-qualified table, e.g. `storage.records`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTableRef")]
pub struct TableRef {
    schema: String,
    table: String,
}

#[derive(Deserialize)]
struct RawTableRef {
    schema: String,
    table: String,
}

impl TryFrom<RawTableRef> for TableRef {
    type Error = RecfilterError;

    fn try_from(raw: RawTableRef) -> Result<Self, Self::Error> {
        TableRef::new(raw.schema, raw.table)
    }
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self, RecfilterError> {
        let schema = schema.into();
        let table = table.into();
        check_identifier("schema", &schema)?;
        check_identifier("table", &table)?;
        Ok(Self { schema, table })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fully qualified column reference: `<schema>.<table>.<column>`.
    ///
    /// Callers pass validated column names only.
    pub(crate) fn qualify(&self, column: &str) -> String {
        format!("{}.{}.{}", self.schema, self.table, column)
    }
}

impl Default for TableRef {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA_NAME.to_string(),
            table: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateOp {
    /// `column = value`
    Equals,
    /// `column >>= value`: the stored cidr range contains or equals the value.
    NetworkContains,
}

impl PredicateOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            PredicateOp::Equals => "=",
            PredicateOp::NetworkContains => ">>=",
        }
    }
}

impl fmt::Display for PredicateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Column and operator an equality predicate compiles to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColumnPredicate")]
pub struct ColumnPredicate {
    column: String,
    op: PredicateOp,
}

#[derive(Deserialize)]
struct RawColumnPredicate {
    column: String,
    op: PredicateOp,
}

impl TryFrom<RawColumnPredicate> for ColumnPredicate {
    type Error = RecfilterError;

    fn try_from(raw: RawColumnPredicate) -> Result<Self, Self::Error> {
        ColumnPredicate::new(raw.column, raw.op)
    }
}

impl ColumnPredicate {
    pub fn new(column: impl Into<String>, op: PredicateOp) -> Result<Self, RecfilterError> {
        let column = column.into();
        check_identifier("column", &column)?;
        Ok(Self { column, op })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> PredicateOp {
        self.op
    }
}

/// Filter field keys are never written into SQL, only the columns they map to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    fields: HashMap<String, ColumnPredicate>,
}

impl FieldMapping {
    /// The mapping for the records table.
    pub fn records() -> Self {
        let fields = [
            ("type", "type", PredicateOp::Equals),
            ("id", "id", PredicateOp::Equals),
            ("$index", "index_cidr", PredicateOp::NetworkContains),
        ]
        .into_iter()
        .map(|(key, column, op)| {
            let predicate = ColumnPredicate {
                column: column.to_string(),
                op,
            };
            (key.to_string(), predicate)
        })
        .collect();
        FieldMapping { fields }
    }

    /// Look up a field key (path segments joined with `.`).
    pub fn get(&self, key: &str) -> Option<&ColumnPredicate> {
        self.fields.get(key)
    }

    /// Field keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        FieldMapping::records()
    }
}

#[derive(Debug, Default)]
pub struct FieldMappingBuilder {
    fields: Vec<(String, String, PredicateOp)>,
}

impl FieldMappingBuilder {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, key: impl Into<String>, column: impl Into<String>, op: PredicateOp) -> Self {
        self.fields.push((key.into(), column.into(), op));
        self
    }

    /// Fails on the first column that is not a plain identifier.
    pub fn build(self) -> Result<FieldMapping, RecfilterError> {
        let mut fields = HashMap::with_capacity(self.fields.len());
        for (key, column, op) in self.fields {
            fields.insert(key, ColumnPredicate::new(column, op)?);
        }
        Ok(FieldMapping { fields })
    }
}
