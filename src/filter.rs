//! Filter module: the output of compiling a filter expression.
//!
//! This module provides the CompiledQuery type.

use crate::types::LiteralValue;

/// Query text with `$N` placeholders and the values bound to them, in placeholder order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledQuery {
    query_text: String,
    params: Vec<LiteralValue>,
}

impl CompiledQuery {
    pub fn new(query_text: impl Into<String>, params: Vec<LiteralValue>) -> Self {
        Self {
            query_text: query_text.into(),
            params,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn params(&self) -> &[LiteralValue] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<LiteralValue>) {
        (self.query_text, self.params)
    }
}
