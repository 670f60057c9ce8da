//! DDL statements issued by schema synchronization.
//!
//! Identifiers cannot be bound as query parameters, so every table, column and
//! constraint name that ends up in a statement goes through [`Ident`].

use std::fmt;

use crate::model::{ColumnSpec, JunctionTable, TableDescriptor};

/// A PostgreSQL identifier, written double-quoted with embedded quotes doubled.
pub struct Ident<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> fmt::Display for Ident<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"")?;
        for c in self.0.as_ref().chars() {
            if c == '"' {
                write!(f, "\"\"")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "\"")
    }
}

pub fn quote_ident(name: &str) -> String {
    Ident(name).to_string()
}

/// Name of the uniqueness constraint added to an existing table.
pub fn unique_constraint_name(table: &str, column: &str) -> String {
    format!("{}_{}_unique", table, column)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ddl {
    CreateTable(TableDescriptor),
    AddColumn { table: String, column: ColumnSpec },
    AddUniqueConstraint { table: String, column: String },
    CreateJunctionTable(JunctionTable),
}

impl Ddl {
    pub fn to_sql(&self) -> String {
        match self {
            Ddl::CreateTable(table) => create_table_sql(table),
            Ddl::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                Ident(table),
                Ident(&column.name),
                column.sql_type
            ),
            Ddl::AddUniqueConstraint { table, column } => format!(
                "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({});",
                Ident(table),
                Ident(unique_constraint_name(table, column)),
                Ident(column)
            ),
            Ddl::CreateJunctionTable(junction) => create_junction_sql(junction),
        }
    }

    /// Table the statement touches
    pub fn table(&self) -> &str {
        match self {
            Ddl::CreateTable(table) => &table.name,
            Ddl::AddColumn { table, .. } | Ddl::AddUniqueConstraint { table, .. } => table,
            Ddl::CreateJunctionTable(junction) => &junction.name,
        }
    }
}

impl fmt::Display for Ddl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn create_table_sql(table: &TableDescriptor) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|col| {
            let mut def = format!("{} {}", Ident(&col.name), col.sql_type);
            if col.is_primary {
                def.push_str(" PRIMARY KEY");
            }
            if col.is_unique {
                def.push_str(" UNIQUE");
            }
            def
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        Ident(&table.name),
        columns.join(", ")
    )
}

fn create_junction_sql(junction: &JunctionTable) -> String {
    let columns: Vec<String> = junction
        .sides
        .iter()
        .map(|side| {
            format!(
                "{} INT REFERENCES {}({})",
                Ident(JunctionTable::key_column(side)),
                Ident(side),
                Ident("id")
            )
        })
        .collect();

    let keys: Vec<String> = junction
        .key_columns()
        .iter()
        .map(|k| Ident(k).to_string())
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({}, PRIMARY KEY ({}));",
        Ident(&junction.name),
        columns.join(", "),
        keys.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, sql_type: &str, is_primary: bool, is_unique: bool) -> ColumnSpec {
        ColumnSpec {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            is_primary,
            is_unique,
        }
    }

    #[test]
    fn test_ident_escapes_quotes() {
        assert_eq!(quote_ident("user"), "\"user\"");
        assert_eq!(quote_ident("bla\"h"), "\"bla\"\"h\"");
    }

    #[test]
    fn test_create_table_inlines_constraints_in_order() {
        let table = TableDescriptor {
            name: "tag".to_string(),
            columns: vec![
                column("id", "SERIAL", true, false),
                column("label", "TEXT", false, true),
            ],
        };

        assert_eq!(
            Ddl::CreateTable(table).to_sql(),
            "CREATE TABLE IF NOT EXISTS \"tag\" (\"id\" SERIAL PRIMARY KEY, \"label\" TEXT UNIQUE);"
        );
    }

    #[test]
    fn test_add_column_and_unique_constraint() {
        let add = Ddl::AddColumn {
            table: "tag".to_string(),
            column: column("label", "TEXT", false, true),
        };
        assert_eq!(add.to_sql(), "ALTER TABLE \"tag\" ADD COLUMN \"label\" TEXT;");

        let unique = Ddl::AddUniqueConstraint {
            table: "tag".to_string(),
            column: "label".to_string(),
        };
        assert_eq!(
            unique.to_sql(),
            "ALTER TABLE \"tag\" ADD CONSTRAINT \"tag_label_unique\" UNIQUE (\"label\");"
        );
        assert_eq!(unique.table(), "tag");
    }

    #[test]
    fn test_junction_sql_has_composite_key() {
        let junction = JunctionTable {
            name: "post_tag".to_string(),
            sides: vec!["post".to_string(), "tag".to_string()],
        };

        assert_eq!(
            Ddl::CreateJunctionTable(junction).to_sql(),
            "CREATE TABLE IF NOT EXISTS \"post_tag\" (\"post_id\" INT REFERENCES \"post\"(\"id\"), \
             \"tag_id\" INT REFERENCES \"tag\"(\"id\"), PRIMARY KEY (\"post_id\", \"tag_id\"));"
        );
    }
}
