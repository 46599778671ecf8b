//! Expression module: defines the filter expression tree.
//!
//! This module provides the FilterExpr type and the conversion from JSON filter documents.

use crate::types::LiteralValue;
use crate::RecfilterError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Equals {
        fields: Vec<String>,
        value: LiteralValue,
    },
    Not(Box<FilterExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// SQL keyword joining the operands.
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }

    /// Value of the operator applied to zero operands.
    pub fn identity(self) -> &'static str {
        match self {
            LogicalOp::And => "TRUE",
            LogicalOp::Or => "FALSE",
        }
    }
}

impl FilterExpr {
    pub fn equals<I, S>(fields: I, value: impl Into<LiteralValue>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterExpr::Equals {
            fields: fields.into_iter().map(Into::into).collect(),
            value: value.into(),
        }
    }

    pub fn and(children: impl IntoIterator<Item = FilterExpr>) -> Self {
        FilterExpr::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = FilterExpr>) -> Self {
        FilterExpr::Or(children.into_iter().collect())
    }

    pub fn negate(inner: FilterExpr) -> Self {
        FilterExpr::Not(Box::new(inner))
    }

    /// Discriminant name of the node, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterExpr::And(_) => "and",
            FilterExpr::Or(_) => "or",
            FilterExpr::Equals { .. } => "equals",
            FilterExpr::Not(_) => "not",
        }
    }

    /// Equality predicates in pre-order, left to right.
    pub fn predicates(&self) -> Vec<(&[String], &LiteralValue)> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<(&'a [String], &'a LiteralValue)>) {
        match self {
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                for child in children {
                    child.collect_predicates(out);
                }
            }
            FilterExpr::Equals { fields, value } => out.push((fields.as_slice(), value)),
            FilterExpr::Not(inner) => inner.collect_predicates(out),
        }
    }

    /// Parses a JSON filter document.
    pub fn from_json_str(input: &str) -> Result<FilterExpr, RecfilterError> {
        let value: Value = serde_json::from_str(input)?;
        FilterExpr::from_json(&value)
    }

    /// Converts a JSON filter document into an expression.
    ///
    /// Object keys are visited in sorted order and combined with `AND`. `$and` and `$or`
    /// take arrays of sub-documents, `$eq` takes a scalar, and any other key extends the
    /// field path. An array below a field becomes an `OR` of its elements.
    pub fn from_json(value: &Value) -> Result<FilterExpr, RecfilterError> {
        match value {
            Value::Object(fields) => from_fields(&[], fields),
            other => Err(RecfilterError::InvalidFilter(format!(
                "filter document must be an object, got {other}"
            ))),
        }
    }
}

fn from_value(path: &[String], value: &Value) -> Result<FilterExpr, RecfilterError> {
    match value {
        Value::Object(fields) => from_fields(path, fields),
        Value::Array(items) => Ok(FilterExpr::Or(from_items(path, items)?)),
        scalar => equals_at(path, scalar),
    }
}

fn from_fields(path: &[String], fields: &Map<String, Value>) -> Result<FilterExpr, RecfilterError> {
    let mut entries: Vec<(&String, &Value)> = fields.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut children = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let child = match key.as_str() {
            "$and" => FilterExpr::And(from_items(path, expect_array(key, value)?)?),
            "$or" => FilterExpr::Or(from_items(path, expect_array(key, value)?)?),
            "$eq" => equals_at(path, value)?,
            _ => {
                let mut nested = path.to_vec();
                nested.push(key.clone());
                from_value(&nested, value)?
            }
        };
        children.push(child);
    }
    Ok(FilterExpr::And(children))
}

fn from_items(path: &[String], items: &[Value]) -> Result<Vec<FilterExpr>, RecfilterError> {
    items.iter().map(|item| from_value(path, item)).collect()
}

fn expect_array<'a>(key: &str, value: &'a Value) -> Result<&'a [Value], RecfilterError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(RecfilterError::InvalidFilter(format!(
            "{key} expects an array, got {other}"
        ))),
    }
}

fn equals_at(path: &[String], value: &Value) -> Result<FilterExpr, RecfilterError> {
    if path.is_empty() {
        return Err(RecfilterError::InvalidFilter(format!(
            "value {value} is not attached to a field"
        )));
    }
    Ok(FilterExpr::Equals {
        fields: path.to_vec(),
        value: scalar(value)?,
    })
}

fn scalar(value: &Value) -> Result<LiteralValue, RecfilterError> {
    match value {
        Value::Bool(b) => Ok(LiteralValue::Bool(*b)),
        Value::String(s) => Ok(LiteralValue::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(LiteralValue::Int(i))
            } else if n.is_f64() {
                n.as_f64()
                    .map(LiteralValue::Float)
                    .ok_or_else(|| RecfilterError::InvalidFilter(format!("number {n} is out of range")))
            } else {
                Err(RecfilterError::InvalidFilter(format!(
                    "integer {n} does not fit in a 64-bit signed integer"
                )))
            }
        }
        Value::Null => Err(RecfilterError::InvalidFilter(
            "null is not a filter value".to_string(),
        )),
        other => Err(RecfilterError::InvalidFilter(format!(
            "expected a scalar value, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind() {
        assert_eq!(FilterExpr::And(vec![]).kind(), "and");
        assert_eq!(FilterExpr::Or(vec![]).kind(), "or");
        assert_eq!(FilterExpr::equals(["id"], "a").kind(), "equals");
        assert_eq!(FilterExpr::negate(FilterExpr::And(vec![])).kind(), "not");
    }

    #[test]
    fn test_logical_op_keywords() {
        assert_eq!(LogicalOp::And.keyword(), "AND");
        assert_eq!(LogicalOp::Or.keyword(), "OR");
        assert_eq!(LogicalOp::And.identity(), "TRUE");
        assert_eq!(LogicalOp::Or.identity(), "FALSE");
    }

    #[test]
    fn test_predicates_pre_order() {
        let expr = FilterExpr::or([
            FilterExpr::and([FilterExpr::equals(["id"], "a"), FilterExpr::equals(["type"], "b")]),
            FilterExpr::equals(["$index"], "10.0.0.1"),
        ]);
        let values: Vec<_> = expr.predicates().into_iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(
            values,
            vec![LiteralValue::from("a"), LiteralValue::from("b"), LiteralValue::from("10.0.0.1")]
        );
    }

    #[test]
    fn test_from_json_flat_document() {
        let expr = FilterExpr::from_json(&json!({"type": "x", "$index": "10.0.0.1"})).unwrap();
        assert_eq!(
            expr,
            FilterExpr::and([
                FilterExpr::equals(["$index"], "10.0.0.1"),
                FilterExpr::equals(["type"], "x"),
            ])
        );
    }

    #[test]
    fn test_from_json_nested_path() {
        let expr = FilterExpr::from_json(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(
            expr,
            FilterExpr::and([FilterExpr::and([FilterExpr::equals(["a", "b"], 1)])])
        );
    }

    #[test]
    fn test_from_json_or_and_eq() {
        let expr = FilterExpr::from_json(&json!({
            "$or": [{"id": "a"}, {"id": "b"}],
            "type": {"$eq": "t"}
        }))
        .unwrap();
        assert_eq!(
            expr,
            FilterExpr::and([
                FilterExpr::or([
                    FilterExpr::and([FilterExpr::equals(["id"], "a")]),
                    FilterExpr::and([FilterExpr::equals(["id"], "b")]),
                ]),
                FilterExpr::and([FilterExpr::equals(["type"], "t")]),
            ])
        );
    }

    #[test]
    fn test_from_json_array_under_field_is_or() {
        let expr = FilterExpr::from_json(&json!({"id": ["a", "b"]})).unwrap();
        assert_eq!(
            expr,
            FilterExpr::and([FilterExpr::or([
                FilterExpr::equals(["id"], "a"),
                FilterExpr::equals(["id"], "b"),
            ])])
        );
    }

    #[test]
    fn test_from_json_rejects_bad_documents() {
        assert!(matches!(
            FilterExpr::from_json(&json!("x")),
            Err(RecfilterError::InvalidFilter(_))
        ));
        assert!(matches!(
            FilterExpr::from_json(&json!({"$and": {"id": "a"}})),
            Err(RecfilterError::InvalidFilter(_))
        ));
        assert!(matches!(
            FilterExpr::from_json(&json!({"$eq": "a"})),
            Err(RecfilterError::InvalidFilter(_))
        ));
        assert!(matches!(
            FilterExpr::from_json(&json!({"id": null})),
            Err(RecfilterError::InvalidFilter(_))
        ));
        assert!(matches!(
            FilterExpr::from_json(&json!({"id": u64::MAX})),
            Err(RecfilterError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_from_json_str_malformed() {
        let res = FilterExpr::from_json_str("{not json");
        assert!(matches!(res, Err(RecfilterError::Serialization(_))));
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(FilterExpr::from_json_str("{}").unwrap(), FilterExpr::And(vec![]));
    }

    #[test]
    fn test_serialization_deserialization() {
        let expr = FilterExpr::or([
            FilterExpr::equals(["type"], "x"),
            FilterExpr::negate(FilterExpr::equals(["id"], 3)),
        ]);
        let json = serde_json::to_string(&expr).unwrap();
        let back: FilterExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }
}
