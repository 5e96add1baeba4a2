use sqlparser::parser::ParserError;
use thiserror::Error;

/// Structural violation found while walking the DDL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("altering table {table:?} must already exist")]
    AlterUnknownTable { table: String },

    #[error("constraint on table {table:?} names unknown column {column:?}")]
    UnknownColumn { table: String, column: String },

    #[error(
        "foreign key on table {table:?} maps {from} column(s) onto {to} referenced column(s)"
    )]
    ForeignKeyArity {
        table: String,
        from: usize,
        to: usize,
    },

    #[error("{kind} appears outside of a CREATE TABLE / ALTER TABLE statement")]
    NoOpenTable { kind: &'static str },
}

/// Failure of the filter -> parse -> extract pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("parse sql: {0}")]
    Parse(#[from] ParserError),

    #[error("walk sql: {0}")]
    Schema(#[from] SchemaError),
}
