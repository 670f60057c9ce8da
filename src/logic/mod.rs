pub mod associations;
pub mod bootstrap;
pub mod ddl;
pub mod descriptor;
pub mod join_table;
pub mod schema_sync;
pub mod tags;

pub use associations::AssociationSynchronizer;
pub use bootstrap::{SchemaBootstrap, SyncReport};
pub use ddl::{quote_ident, Ddl, Ident};
pub use descriptor::{column_spec, column_type, describe};
pub use join_table::JoinTableBuilder;
pub use schema_sync::{ModelSync, SchemaSynchronizer};
pub use tags::TagService;
