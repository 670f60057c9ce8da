pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{BlogError, Result};

// Export logic types
pub use logic::{
    AssociationSynchronizer, JoinTableBuilder, SchemaBootstrap, SchemaSynchronizer, SyncReport,
    TagService,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

/// Provision the database, synchronize the schema and return a ready store.
///
/// Any failure here must stop the process before it starts serving.
pub async fn prepare_store(config: &crate::config::AppConfig) -> anyhow::Result<PostgresStore> {
    if config.database.connection_string.is_none() {
        let server = config.connect_options(false)?;
        PostgresStore::ensure_database(&server, &config.database.dbname).await?;
    }

    let store = PostgresStore::new(
        config.connect_options(true)?,
        config.database.max_connections,
    )
    .await?;

    SchemaBootstrap::declared().run(&store).await?;

    Ok(store)
}
