//! Recfilter: compiles boolean filter expressions into parameterized PostgreSQL conditions.
//!
//! A filter is a tree of `AND`/`OR` compounds over field-equality predicates. The compiler
//! turns it into a `WHERE` fragment with `$N` placeholders plus the ordered values to bind,
//! ready to be spliced into a query against a records table.
//!
//! # Architecture
//! - Filter expressions (closed sum type, JSON filter documents)
//! - Field mapping (filter field key to qualified column and operator)
//! - Compilation to `(query text, parameters)`
//! - Query assembly for the records table

mod types;
mod expr;
mod schema;
mod config;
mod compiler;
mod filter;
mod query;

pub use types::*;
pub use expr::*;
pub use schema::*;
pub use config::*;
pub use compiler::*;
pub use filter::*;
pub use query::*;

use thiserror::Error;

/// Unified error type for Recfilter operations
#[derive(Debug, Error)]
pub enum RecfilterError {
    /// An equality predicate names a field path the mapping does not know.
    #[error("unsupported equals filter: {fields:?}")]
    UnsupportedField { fields: Vec<String> },

    /// The expression variant has no translation for this target.
    #[error("unsupported filter expression: {0}")]
    UnsupportedExpressionType(&'static str),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
