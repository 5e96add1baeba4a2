//! Single-pass schema extraction over lowered DDL nodes.
//!
//! The walk state is an explicit [`ExtractorState`] value. A table opened by
//! `CREATE TABLE` stays open (and keeps receiving column definitions and
//! table-level constraints) until the next `CREATE TABLE` / `ALTER TABLE` or
//! the end of input, at which point it is committed exactly once.
//! `ALTER TABLE` never opens a table: its constraints are applied through the
//! column registry against an already committed table.

use crate::error::SchemaError;
use crate::lower::{AddConstraint, ColumnSpec, DdlNode, ForeignKeySpec, UniqueSpec};
use crate::model::{column_key, Column, ColumnLocation, Reference, SqlSchema, Table};

#[derive(Debug, Default)]
pub struct ExtractorState {
    schema: SqlSchema,
    open: Option<Table>,
}

impl ExtractorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table currently under construction, if any.
    pub fn open_table(&self) -> Option<&Table> {
        self.open.as_ref()
    }

    /// Tables committed so far (excludes the open table).
    pub fn committed_tables(&self) -> &[Table] {
        &self.schema.tables
    }

    pub fn references(&self) -> &[Reference] {
        &self.schema.references
    }

    pub fn visit(&mut self, node: DdlNode) -> Result<(), SchemaError> {
        match node {
            DdlNode::CreateTable { name } => {
                self.commit();
                self.open = Some(Table::new(name));
            }
            DdlNode::ColumnDef(spec) => self.add_column(spec)?,
            DdlNode::ForeignKeyConstraint(spec) => {
                let table = self.open_table_name("FOREIGN KEY constraint")?;
                self.apply_foreign_key(&table, spec)?;
            }
            DdlNode::UniqueConstraint(spec) => {
                let table = self.open_table_name("UNIQUE constraint")?;
                self.apply_unique(&table, spec)?;
            }
            DdlNode::AlterTable { table, commands } => {
                self.commit();
                if !self.schema.tables.iter().any(|t| t.name == table) {
                    return Err(SchemaError::AlterUnknownTable { table });
                }
                for command in commands {
                    match command {
                        AddConstraint::Unique(spec) => self.apply_unique(&table, spec)?,
                        AddConstraint::ForeignKey(spec) => self.apply_foreign_key(&table, spec)?,
                    }
                }
            }
        }
        Ok(())
    }

    /// Commit the open table (if any) and return the finished schema.
    pub fn finish(mut self) -> SqlSchema {
        self.commit();
        self.schema
    }

    fn commit(&mut self) {
        if let Some(table) = self.open.take() {
            self.schema.tables.push(table);
        }
    }

    fn open_table_name(&self, kind: &'static str) -> Result<String, SchemaError> {
        self.open
            .as_ref()
            .map(|t| t.name.clone())
            .ok_or(SchemaError::NoOpenTable { kind })
    }

    fn add_column(&mut self, spec: ColumnSpec) -> Result<(), SchemaError> {
        let table_index = self.schema.tables.len();
        let table = self.open.as_mut().ok_or(SchemaError::NoOpenTable {
            kind: "column definition",
        })?;

        let mut column = Column::new(spec.name, spec.data_type);
        column.primary = spec.primary;
        column.not_null = spec.not_null;
        column.unique = spec.unique;

        if let Some(target) = spec.references {
            column.references = true;
            self.schema.references.push(Reference {
                from_table: table.name.clone(),
                to_table: target.table,
                from_columns: vec![column.name.clone()],
                to_columns: target.column.into_iter().collect(),
            });
        }

        self.schema.columns.insert(
            column_key(&table.name, &column.name),
            ColumnLocation {
                table: table_index,
                column: table.columns.len(),
            },
        );
        table.columns.push(column);
        Ok(())
    }

    fn apply_foreign_key(&mut self, table: &str, spec: ForeignKeySpec) -> Result<(), SchemaError> {
        let ForeignKeySpec {
            from_columns,
            to_table,
            to_columns,
        } = spec;

        if !to_columns.is_empty() && to_columns.len() != from_columns.len() {
            return Err(SchemaError::ForeignKeyArity {
                table: table.to_string(),
                from: from_columns.len(),
                to: to_columns.len(),
            });
        }

        // Identical column lists are recorded as implied.
        let to_columns = if to_columns == from_columns {
            Vec::new()
        } else {
            to_columns
        };

        self.schema.references.push(Reference {
            from_table: table.to_string(),
            to_table,
            from_columns,
            to_columns,
        });
        Ok(())
    }

    fn apply_unique(&mut self, table: &str, spec: UniqueSpec) -> Result<(), SchemaError> {
        let composite = spec.columns.len() > 1;
        for name in &spec.columns {
            let column = self.column_mut(table, name).ok_or_else(|| SchemaError::UnknownColumn {
                table: table.to_string(),
                column: name.clone(),
            })?;
            column.unique = true;
            column.primary = spec.primary;

            if composite {
                self.schema.complex_unique_keys.insert(column_key(table, name));
            }
        }
        Ok(())
    }

    fn column_mut(&mut self, table: &str, column: &str) -> Option<&mut Column> {
        let loc = *self.schema.columns.get(&column_key(table, column))?;
        if loc.table == self.schema.tables.len() {
            self.open.as_mut()?.columns.get_mut(loc.column)
        } else {
            self.schema.tables.get_mut(loc.table)?.columns.get_mut(loc.column)
        }
    }
}

/// Walk `nodes` in order and build the schema. Any [`SchemaError`] aborts the
/// whole extraction.
pub fn extract_schema(nodes: impl IntoIterator<Item = DdlNode>) -> Result<SqlSchema, SchemaError> {
    let mut state = ExtractorState::new();
    for node in nodes {
        state.visit(node)?;
    }
    Ok(state.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::{lower_statements, InlineReference};
    use sqlparser::dialect::PostgreSqlDialect;
    use sqlparser::parser::Parser;

    fn extract(sql: &str) -> Result<SqlSchema, SchemaError> {
        let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql).expect("parse");
        extract_schema(lower_statements(&statements))
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn column_flags_from_inline_constraints() {
        let schema = extract("create table t (id int primary key, name text not null)").expect("extract");
        assert_eq!(schema.tables.len(), 1);

        let id = schema.column("t", "id").expect("id");
        assert!(id.primary);
        assert!(!id.not_null);
        assert!(!id.unique);

        let name = schema.column("t", "name").expect("name");
        assert!(name.not_null);
        assert!(!name.primary);
        assert_eq!(name.data_type, "TEXT");
    }

    #[test]
    fn inline_reference_keeps_both_column_lists() {
        let schema = extract(
            "create table a (id int primary key); create table b (id int references a(id))",
        )
        .expect("extract");
        assert_eq!(
            schema.references,
            vec![Reference {
                from_table: "b".to_string(),
                to_table: "a".to_string(),
                from_columns: strings(&["id"]),
                to_columns: strings(&["id"]),
            }]
        );
        assert!(schema.column("b", "id").expect("b.id").references);
    }

    #[test]
    fn table_level_fk_with_identical_names_is_implied() {
        let schema = extract(
            "create table a (x int, y int, primary key (x, y));
             create table b (x int, y int, foreign key (x, y) references a (x, y));
             create table c (p int, q int, foreign key (p, q) references a (x, y))",
        )
        .expect("extract");
        assert_eq!(schema.references.len(), 2);
        assert_eq!(schema.references[0].from_columns, strings(&["x", "y"]));
        assert!(schema.references[0].to_columns.is_empty());
        assert_eq!(schema.references[1].to_columns, strings(&["x", "y"]));
        assert!(!schema.column("b", "x").expect("b.x").references);
    }

    #[test]
    fn composite_unique_marks_complex_keys() {
        let schema = extract("create table t (a int, b int, c int unique, unique (a, b))").expect("extract");
        assert!(schema.column("t", "a").expect("a").unique);
        assert!(schema.is_complex_unique("t", "a"));
        assert!(schema.is_complex_unique("t", "b"));
        assert!(!schema.is_complex_unique("t", "c"));
    }

    #[test]
    fn table_primary_key_sets_primary_flag() {
        let schema = extract("create table t (id int, primary key (id))").expect("extract");
        let id = schema.column("t", "id").expect("id");
        assert!(id.primary);
        assert!(id.unique);
        assert!(!schema.is_complex_unique("t", "id"));
    }

    #[test]
    fn alter_applies_constraints_to_committed_table() {
        let schema = extract(
            "create table a (id int not null);
             create table b (a_id int);
             alter table a add constraint a_pk primary key (id);
             alter table b add constraint b_fk foreign key (a_id) references a (id)",
        )
        .expect("extract");
        assert_eq!(schema.tables.len(), 2);
        assert!(schema.column("a", "id").expect("a.id").primary);
        assert_eq!(
            schema.references,
            vec![Reference {
                from_table: "b".to_string(),
                to_table: "a".to_string(),
                from_columns: strings(&["a_id"]),
                to_columns: strings(&["id"]),
            }]
        );
    }

    #[test]
    fn alter_of_missing_table_fails() {
        let err = extract("create table a (id int); alter table b add constraint u unique (id)")
            .expect_err("should fail");
        assert_eq!(
            err,
            SchemaError::AlterUnknownTable {
                table: "b".to_string()
            }
        );
    }

    #[test]
    fn alter_does_not_see_tables_created_later() {
        let err = extract("alter table a add constraint u unique (id); create table a (id int)")
            .expect_err("should fail");
        assert!(matches!(err, SchemaError::AlterUnknownTable { .. }));
    }

    #[test]
    fn unique_on_unknown_column_fails() {
        let err = extract("create table t (a int, unique (b))").expect_err("should fail");
        assert_eq!(
            err,
            SchemaError::UnknownColumn {
                table: "t".to_string(),
                column: "b".to_string()
            }
        );
    }

    #[test]
    fn fk_arity_mismatch_fails() {
        let err = extract("create table t (a int, b int, foreign key (a, b) references u (x))")
            .expect_err("should fail");
        assert!(matches!(err, SchemaError::ForeignKeyArity { from: 2, to: 1, .. }));
    }

    #[test]
    fn open_table_is_committed_on_next_statement() {
        let mut state = ExtractorState::new();
        state
            .visit(DdlNode::CreateTable {
                name: "a".to_string(),
            })
            .expect("visit");
        state
            .visit(DdlNode::ColumnDef(ColumnSpec {
                name: "b_id".to_string(),
                data_type: "INT".to_string(),
                primary: false,
                not_null: false,
                unique: false,
                references: Some(InlineReference {
                    table: "b".to_string(),
                    column: Some("id".to_string()),
                }),
            }))
            .expect("visit");
        assert_eq!(state.open_table().map(|t| t.name.as_str()), Some("a"));
        assert!(state.committed_tables().is_empty());
        assert_eq!(
            state.references(),
            &[Reference {
                from_table: "a".to_string(),
                to_table: "b".to_string(),
                from_columns: vec!["b_id".to_string()],
                to_columns: vec!["id".to_string()],
            }]
        );

        state
            .visit(DdlNode::AlterTable {
                table: "a".to_string(),
                commands: vec![],
            })
            .expect("visit");
        assert!(state.open_table().is_none());
        assert_eq!(state.committed_tables().len(), 1);

        assert_eq!(state.references().len(), 1);

        let schema = state.finish();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.references.len(), 1);
    }

    #[test]
    fn column_outside_table_fails() {
        let mut state = ExtractorState::new();
        let err = state
            .visit(DdlNode::ColumnDef(ColumnSpec {
                name: "x".to_string(),
                data_type: "INT".to_string(),
                primary: false,
                not_null: false,
                unique: false,
                references: None,
            }))
            .expect_err("should fail");
        assert!(matches!(err, SchemaError::NoOpenTable { .. }));
    }
}
