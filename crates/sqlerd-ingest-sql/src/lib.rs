//! SQL schema discovery for sqlerd
//!
//! Turns a dump of SQL DDL into a normalized schema model:
//! - Tables -> ordered columns with constraint flags
//! - Foreign keys (inline, table-level, `ALTER TABLE ... ADD CONSTRAINT`) -> references
//! - Unique / primary key constraints -> column flags + composite key set
//!
//! The pipeline is `filter -> parse -> lower -> extract`, followed by
//! [`cardinality`] resolution for each reference endpoint.

pub mod cardinality;
pub mod error;
pub mod extract;
pub mod filter;
pub mod lower;
pub mod model;

pub use cardinality::{
    endpoint_flags, resolve_endpoint, resolve_reference, Cardinality, EndpointFlags,
    RelationshipCardinality,
};
pub use error::{IngestError, SchemaError};
pub use extract::{extract_schema, ExtractorState};
pub use filter::{filter_statements, FilteredSql};
pub use lower::{lower_statements, DdlNode};
pub use model::{column_key, Column, ColumnLocation, Reference, SqlSchema, Table};

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Filter, parse and extract a schema from raw SQL DDL text.
pub fn parse_sql_ddl(sql: &str) -> Result<SqlSchema, IngestError> {
    let filtered = filter_statements(sql);
    tracing::debug!(
        kept = filtered.kept,
        dropped = filtered.dropped,
        "filtered sql statements"
    );

    let dialect = PostgreSqlDialect {};
    let statements = Parser::parse_sql(&dialect, &filtered.sql)?;

    let nodes = lower_statements(&statements);
    let schema = extract_schema(nodes)?;
    tracing::debug!(
        tables = schema.tables.len(),
        references = schema.references.len(),
        "extracted sql schema"
    );
    Ok(schema)
}
