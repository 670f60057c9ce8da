use std::collections::HashSet;

use crate::error::Result;
use crate::logic::ddl::Ddl;
use crate::logic::descriptor::describe;
use crate::model::{ModelDef, TableDescriptor};
use crate::store::traits::SchemaCatalog;

/// Outcome of synchronizing one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSync {
    pub table: String,
    pub alterations: Vec<Ddl>,
}

/// Creates tables from descriptors and evolves them additively.
///
/// Migration only ever adds: columns the catalog has but the descriptor lacks
/// are left in place, and existing column types are never changed.
pub struct SchemaSynchronizer;

impl SchemaSynchronizer {
    /// Derive, create, then migrate the table of one model
    pub async fn sync_model<C: SchemaCatalog + ?Sized>(
        catalog: &C,
        model: &ModelDef,
    ) -> Result<ModelSync> {
        let table = describe(model)?;
        Self::create(catalog, &table).await?;
        let alterations = Self::migrate(catalog, &table).await?;

        Ok(ModelSync {
            table: table.name,
            alterations,
        })
    }

    /// `CREATE TABLE IF NOT EXISTS`; safe to run repeatedly
    pub async fn create<C: SchemaCatalog + ?Sized>(
        catalog: &C,
        table: &TableDescriptor,
    ) -> Result<()> {
        catalog
            .execute_ddl(&Ddl::CreateTable(table.clone()))
            .await
            .map_err(|e| e.context(format!("error creating table {}", table.name)))?;

        log::info!("Table {} ready", table.name);
        Ok(())
    }

    /// Statements that bring a table with `existing` columns up to the descriptor.
    pub fn plan_migration(table: &TableDescriptor, existing: &HashSet<String>) -> Vec<Ddl> {
        let mut statements = Vec::new();

        for column in &table.columns {
            if existing.contains(&column.name) {
                continue;
            }

            statements.push(Ddl::AddColumn {
                table: table.name.clone(),
                column: column.clone(),
            });

            if column.is_unique {
                statements.push(Ddl::AddUniqueConstraint {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        statements
    }

    /// Add every descriptor column missing from the live catalog.
    ///
    /// Stops at the first failing statement; statements already executed stay applied.
    pub async fn migrate<C: SchemaCatalog + ?Sized>(
        catalog: &C,
        table: &TableDescriptor,
    ) -> Result<Vec<Ddl>> {
        let existing = catalog
            .existing_columns(&table.name)
            .await
            .map_err(|e| e.context("error querying existing columns"))?;

        let statements = Self::plan_migration(table, &existing);

        for statement in &statements {
            catalog
                .execute_ddl(statement)
                .await
                .map_err(|e| e.context(format!("error executing query {}", statement)))?;
            log::info!("Applied: {}", statement);
        }

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, Tag};

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plan_is_empty_when_catalog_matches() {
        let table = describe(&Tag::MODEL).unwrap();
        assert!(SchemaSynchronizer::plan_migration(&table, &names(&["id", "label"])).is_empty());
    }

    #[test]
    fn test_plan_adds_missing_unique_column_with_constraint() {
        let table = describe(&Tag::MODEL).unwrap();
        let plan = SchemaSynchronizer::plan_migration(&table, &names(&["id"]));

        assert_eq!(plan.len(), 2);
        assert!(matches!(&plan[0], Ddl::AddColumn { column, .. } if column.name == "label"));
        assert!(matches!(&plan[1], Ddl::AddUniqueConstraint { column, .. } if column == "label"));
    }

    #[test]
    fn test_plan_ignores_columns_only_in_catalog() {
        let table = describe(&Tag::MODEL).unwrap();
        let plan =
            SchemaSynchronizer::plan_migration(&table, &names(&["id", "label", "legacy_color"]));
        assert!(plan.is_empty());
    }
}
