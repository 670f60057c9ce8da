use crate::error::{BlogError, Result};
use crate::logic::ddl::Ddl;
use crate::model::{JunctionTable, RelationshipDecl};
use crate::store::traits::SchemaCatalog;

pub struct JoinTableBuilder;

impl JoinTableBuilder {
    /// Junction table for a declaration: name `a_b`, one `<side>_id` column per side.
    pub fn junction(decl: &RelationshipDecl) -> Result<JunctionTable> {
        if decl.tables.len() < 2 {
            return Err(BlogError::Relation(format!(
                "each entry must contain at least two table names, got {:?}",
                decl.tables
            )));
        }

        let sides: Vec<String> = decl.tables.iter().map(|t| t.to_lowercase()).collect();

        Ok(JunctionTable {
            name: sides.join("_"),
            sides,
        })
    }

    /// Create every junction table in order, stopping at the first failure.
    ///
    /// Referenced tables are not checked here; the storage engine enforces the
    /// foreign keys if it supports them.
    pub async fn create_all<C: SchemaCatalog + ?Sized>(
        catalog: &C,
        decls: &[RelationshipDecl],
    ) -> Result<Vec<JunctionTable>> {
        let mut created = Vec::with_capacity(decls.len());

        for decl in decls {
            let junction = Self::junction(decl)?;
            catalog
                .execute_ddl(&Ddl::CreateJunctionTable(junction.clone()))
                .await
                .map_err(|e| e.context(format!("error creating join table {}", junction.name)))?;

            log::info!("Join table {} ready", junction.name);
            created.push(junction);
        }

        Ok(created)
    }
}
