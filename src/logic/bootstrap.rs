use serde::Serialize;

use crate::error::Result;
use crate::logic::ddl::Ddl;
use crate::logic::join_table::JoinTableBuilder;
use crate::logic::schema_sync::SchemaSynchronizer;
use crate::model::{declared_models, declared_relationships, ModelDef, RelationshipDecl};
use crate::store::traits::SchemaCatalog;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub tables: Vec<String>,
    pub added_columns: usize,
    pub junction_tables: Vec<String>,
}

/// Startup schema sequence: every model table (create, then migrate), then
/// every junction table. Must finish before requests are served and must not
/// run concurrently with itself.
#[derive(Debug, Clone)]
pub struct SchemaBootstrap {
    models: Vec<ModelDef>,
    relationships: Vec<RelationshipDecl>,
}

impl SchemaBootstrap {
    pub fn new(models: Vec<ModelDef>, relationships: Vec<RelationshipDecl>) -> Self {
        Self {
            models,
            relationships,
        }
    }

    /// Post and Tag tables plus the post_tag junction
    pub fn declared() -> Self {
        Self::new(declared_models(), declared_relationships())
    }

    pub async fn run<C: SchemaCatalog + ?Sized>(&self, catalog: &C) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for model in &self.models {
            let sync = SchemaSynchronizer::sync_model(catalog, model)
                .await
                .inspect_err(|e| {
                    log::error!("Error setting up table for model {}: {}", model.name, e)
                })?;

            report.added_columns += sync
                .alterations
                .iter()
                .filter(|s| matches!(s, Ddl::AddColumn { .. }))
                .count();
            report.tables.push(sync.table);
        }

        let junctions = JoinTableBuilder::create_all(catalog, &self.relationships)
            .await
            .inspect_err(|e| log::error!("Error creating join tables: {}", e))?;
        report.junction_tables = junctions.into_iter().map(|j| j.name).collect();

        log::info!(
            "Schema synchronized: {} tables, {} added columns, {} join tables",
            report.tables.len(),
            report.added_columns,
            report.junction_tables.len()
        );

        Ok(report)
    }
}
