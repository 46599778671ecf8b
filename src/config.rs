//! Config module: naming of the table the compiler targets.

use crate::schema::{check_identifier, TableRef};
use crate::RecfilterError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHEMA_NAME: &str = "storage";
pub const DEFAULT_TABLE_NAME: &str = "records";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub schema_name: String,
    pub table_name: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn new(schema_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
        }
    }

    /// Both names are spliced into SQL unquoted, so they must be plain identifiers.
    pub fn validate(&self) -> Result<(), RecfilterError> {
        check_identifier("schema_name", &self.schema_name)?;
        check_identifier("table_name", &self.table_name)
    }

    pub fn table(&self) -> Result<TableRef, RecfilterError> {
        self.validate()?;
        TableRef::new(&self.schema_name, &self.table_name)
    }
}
