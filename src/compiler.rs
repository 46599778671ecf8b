//! Compiler module: compiles filter expressions into PostgreSQL condition fragments.
//!
//! Compilation is a pure function of the expression, the target table and the field
//! mapping. Each node returns its own fragment and parameters; parents compose them, so a
//! failure anywhere leaves nothing half-built behind.

use crate::config::CompilerConfig;
use crate::expr::{FilterExpr, LogicalOp};
use crate::filter::CompiledQuery;
use crate::schema::{FieldMapping, TableRef};
use crate::types::LiteralValue;
use crate::RecfilterError;
use std::fmt;
use tracing::{debug, trace};

/// 1-based positional parameter reference, rendered as `$N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Deepest nesting of compound nodes the compiler accepts.
pub const MAX_FILTER_DEPTH: usize = 128;

#[derive(Debug, Clone)]
pub struct PostgresCompiler {
    table: TableRef,
    mapping: FieldMapping,
}

impl PostgresCompiler {
    /// Compiler for the configured records table with the built-in field mapping.
    pub fn new(config: &CompilerConfig) -> Result<Self, RecfilterError> {
        Ok(Self::with_mapping(config.table()?, FieldMapping::records()))
    }

    pub fn with_mapping(table: TableRef, mapping: FieldMapping) -> Self {
        Self { table, mapping }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Compiles `expr` into a condition fragment.
    ///
    /// `start_param_index` is the number of parameters already bound by the enclosing
    /// query; the first placeholder emitted is `$<start_param_index + 1>`. Trees nested
    /// deeper than [`MAX_FILTER_DEPTH`] are rejected.
    pub fn compile(&self, expr: &FilterExpr, start_param_index: usize) -> Result<CompiledQuery, RecfilterError> {
        match self.compile_expr(expr, start_param_index, 1) {
            Ok(query) => {
                debug!(
                    start_param_index,
                    params = query.params().len(),
                    text_len = query.query_text().len(),
                    "compiled filter"
                );
                Ok(query)
            }
            Err(err) => {
                debug!(error = %err, "rejected filter");
                Err(err)
            }
        }
    }

    fn compile_expr(&self, expr: &FilterExpr, offset: usize, depth: usize) -> Result<CompiledQuery, RecfilterError> {
        if depth > MAX_FILTER_DEPTH {
            return Err(RecfilterError::InvalidFilter(format!(
                "filter nesting exceeds {MAX_FILTER_DEPTH} levels"
            )));
        }
        match expr {
            FilterExpr::And(children) => self.compile_compound(children, LogicalOp::And, offset, depth),
            FilterExpr::Or(children) => self.compile_compound(children, LogicalOp::Or, offset, depth),
            FilterExpr::Equals { fields, value } => self.compile_equals(fields, value, offset),
            other => Err(RecfilterError::UnsupportedExpressionType(other.kind())),
        }
    }

    fn compile_compound(
        &self,
        children: &[FilterExpr],
        op: LogicalOp,
        offset: usize,
        depth: usize,
    ) -> Result<CompiledQuery, RecfilterError> {
        // `( )` is not valid SQL
        if children.is_empty() {
            return Ok(CompiledQuery::new(op.identity(), Vec::new()));
        }

        let mut fragments = Vec::with_capacity(children.len());
        let mut params = Vec::new();
        for child in children {
            let child_offset = checked_index(offset, params.len())?;
            let (text, child_params) = self.compile_expr(child, child_offset, depth + 1)?.into_parts();
            fragments.push(text);
            params.extend(child_params);
        }

        let separator = format!(" {} ", op.keyword());
        Ok(CompiledQuery::new(
            format!("( {} )", fragments.join(&separator)),
            params,
        ))
    }

    fn compile_equals(
        &self,
        fields: &[String],
        value: &LiteralValue,
        offset: usize,
    ) -> Result<CompiledQuery, RecfilterError> {
        let key = fields.join(".");
        let Some(predicate) = self.mapping.get(&key) else {
            debug!(field = %key, supported = ?self.mapping.keys(), "unknown filter field");
            return Err(RecfilterError::UnsupportedField {
                fields: fields.to_vec(),
            });
        };

        let placeholder = Placeholder(checked_index(offset, 1)?);
        trace!(
            field = %key,
            column = predicate.column(),
            value_type = value.type_name(),
            %placeholder,
            "equality predicate"
        );

        let text = format!(
            "{} {} {}",
            self.table.qualify(predicate.column()),
            predicate.op(),
            placeholder
        );
        Ok(CompiledQuery::new(text, vec![value.clone()]))
    }
}

fn checked_index(offset: usize, delta: usize) -> Result<usize, RecfilterError> {
    offset
        .checked_add(delta)
        .ok_or_else(|| RecfilterError::InvalidFilter("parameter index overflow".to_string()))
}

impl Default for PostgresCompiler {
    fn default() -> Self {
        Self::with_mapping(TableRef::default(), FieldMapping::records())
    }
}
