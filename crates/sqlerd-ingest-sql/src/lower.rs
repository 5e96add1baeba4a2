//! Lowers the parser's statement AST into the small closed set of DDL shapes
//! the extractor consumes, in document order.

use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, Ident, ObjectName, Statement, TableConstraint,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlNode {
    CreateTable { name: String },
    ColumnDef(ColumnSpec),
    ForeignKeyConstraint(ForeignKeySpec),
    UniqueConstraint(UniqueSpec),
    AlterTable {
        table: String,
        commands: Vec<AddConstraint>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: String,
    pub primary: bool,
    pub not_null: bool,
    pub unique: bool,
    pub references: Option<InlineReference>,
}

/// `REFERENCES table [(column)]` written on a column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineReference {
    pub table: String,
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub from_columns: Vec<String>,
    pub to_table: String,
    pub to_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueSpec {
    pub columns: Vec<String>,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddConstraint {
    Unique(UniqueSpec),
    ForeignKey(ForeignKeySpec),
}

/// Case-folded identifier without quotes.
pub fn normalize_ident(ident: &Ident) -> String {
    ident.value.to_lowercase()
}

/// Last part of a possibly qualified name (`public.users` -> `users`).
pub fn normalize_object_name(name: &ObjectName) -> String {
    name.0.last().map(normalize_ident).unwrap_or_default()
}

fn normalize_idents(idents: &[Ident]) -> Vec<String> {
    idents.iter().map(normalize_ident).collect()
}

pub fn lower_statements(statements: &[Statement]) -> Vec<DdlNode> {
    let mut nodes = Vec::new();

    for stmt in statements {
        match stmt {
            Statement::CreateTable {
                name,
                columns,
                constraints,
                ..
            } => {
                nodes.push(DdlNode::CreateTable {
                    name: normalize_object_name(name),
                });
                nodes.extend(columns.iter().map(|c| DdlNode::ColumnDef(lower_column(c))));
                nodes.extend(constraints.iter().filter_map(|c| {
                    lower_constraint(c).map(|c| match c {
                        AddConstraint::Unique(u) => DdlNode::UniqueConstraint(u),
                        AddConstraint::ForeignKey(fk) => DdlNode::ForeignKeyConstraint(fk),
                    })
                }));
            }
            Statement::AlterTable {
                name, operations, ..
            } => {
                let commands = operations
                    .iter()
                    .filter_map(|op| match op {
                        AlterTableOperation::AddConstraint(c) => lower_constraint(c),
                        _ => None,
                    })
                    .collect();
                nodes.push(DdlNode::AlterTable {
                    table: normalize_object_name(name),
                    commands,
                });
            }
            _ => {}
        }
    }

    nodes
}

fn lower_column(col: &ColumnDef) -> ColumnSpec {
    let mut spec = ColumnSpec {
        name: normalize_ident(&col.name),
        data_type: col.data_type.to_string(),
        primary: false,
        not_null: false,
        unique: false,
        references: None,
    };

    for opt in &col.options {
        match &opt.option {
            ColumnOption::NotNull => spec.not_null = true,
            ColumnOption::Null => spec.not_null = false,
            ColumnOption::Unique { is_primary, .. } => {
                if *is_primary {
                    spec.primary = true;
                } else {
                    spec.unique = true;
                }
            }
            ColumnOption::ForeignKey {
                foreign_table,
                referred_columns,
                ..
            } if spec.references.is_none() => {
                spec.references = Some(InlineReference {
                    table: normalize_object_name(foreign_table),
                    column: referred_columns.first().map(normalize_ident),
                });
            }
            _ => {}
        }
    }

    spec
}

fn lower_constraint(constraint: &TableConstraint) -> Option<AddConstraint> {
    match constraint {
        TableConstraint::Unique {
            columns,
            is_primary,
            ..
        } => Some(AddConstraint::Unique(UniqueSpec {
            columns: normalize_idents(columns),
            primary: *is_primary,
        })),
        TableConstraint::ForeignKey {
            columns,
            foreign_table,
            referred_columns,
            ..
        } => Some(AddConstraint::ForeignKey(ForeignKeySpec {
            from_columns: normalize_idents(columns),
            to_table: normalize_object_name(foreign_table),
            to_columns: normalize_idents(referred_columns),
        })),
        _ => None,
    }
}
