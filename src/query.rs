//! Query module: assembles record listing queries around a compiled filter.

use crate::compiler::{Placeholder, PostgresCompiler};
use crate::expr::FilterExpr;
use crate::filter::CompiledQuery;
use crate::schema::{check_identifier, TableRef};
use crate::types::LiteralValue;
use crate::RecfilterError;
use tracing::debug;

const RECORD_COLUMNS: &str = "type, id, version, data, modified_at";

/// Builder for `SELECT ... FROM <schema>.<table> WHERE ...` over the records table.
///
/// Conditions are joined with `AND` in the order they were added, and the parameters of
/// each condition continue the numbering of the ones before it.
#[derive(Debug, Clone)]
pub struct SelectRecords {
    table: TableRef,
    conditions: Vec<String>,
    params: Vec<LiteralValue>,
    limit: Option<u64>,
}

impl SelectRecords {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            params: Vec::new(),
            limit: None,
        }
    }

    /// Adds `<schema>.<table>.<column> = $N`; `column` must be a plain identifier.
    pub fn bind_condition(mut self, column: &str, value: impl Into<LiteralValue>) -> Result<Self, RecfilterError> {
        check_identifier("column", column)?;
        self.params.push(value.into());
        let placeholder = Placeholder(self.params.len());
        self.conditions
            .push(format!("{} = {}", self.table.qualify(column), placeholder));
        Ok(self)
    }

    /// Compiles `expr` after the parameters bound so far and adds it as a condition.
    ///
    /// On error the builder is dropped, so a query with a missing filter cannot be built.
    pub fn filter(mut self, compiler: &PostgresCompiler, expr: &FilterExpr) -> Result<Self, RecfilterError> {
        let (text, params) = compiler.compile(expr, self.params.len())?.into_parts();
        self.conditions.push(text);
        self.params.extend(params);
        Ok(self)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> CompiledQuery {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM {}", self.table);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY type, id");
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        debug!(params = self.params.len(), "built record query");
        CompiledQuery::new(sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableRef {
        TableRef::new("storage", "records").unwrap()
    }

    #[test]
    fn test_no_conditions() {
        let query = SelectRecords::new(table()).build();
        assert_eq!(
            query.query_text(),
            "SELECT type, id, version, data, modified_at FROM storage.records ORDER BY type, id"
        );
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_bound_condition_then_filter() {
        let compiler = PostgresCompiler::default();
        let expr = FilterExpr::or([FilterExpr::equals(["id"], "a"), FilterExpr::equals(["$index"], "10.1.2.3")]);
        let query = SelectRecords::new(table())
            .bind_condition("type", "type.googleapis.com/session")
            .unwrap()
            .filter(&compiler, &expr)
            .unwrap()
            .limit(50)
            .build();
        assert_eq!(
            query.query_text(),
            "SELECT type, id, version, data, modified_at FROM storage.records \
             WHERE storage.records.type = $1 \
             AND ( storage.records.id = $2 OR storage.records.index_cidr >>= $3 ) \
             ORDER BY type, id LIMIT 50"
        );
        assert_eq!(
            query.params(),
            &[
                LiteralValue::from("type.googleapis.com/session"),
                LiteralValue::from("a"),
                LiteralValue::from("10.1.2.3"),
            ]
        );
    }

    #[test]
    fn test_filter_error_aborts_build() {
        let compiler = PostgresCompiler::default();
        let res = SelectRecords::new(table())
            .bind_condition("type", "t")
            .unwrap()
            .filter(&compiler, &FilterExpr::equals(["version"], 1));
        assert!(matches!(res, Err(RecfilterError::UnsupportedField { .. })));
    }

    #[test]
    fn test_bind_condition_rejects_injected_column() {
        let res = SelectRecords::new(table()).bind_condition("id OR 1=1 --", "a");
        assert!(matches!(res, Err(RecfilterError::InvalidConfig(_))));
    }
}
