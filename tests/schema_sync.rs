use blog_db_rust::logic::{describe, Ddl, JoinTableBuilder, SchemaBootstrap, SchemaSynchronizer};
use blog_db_rust::model::{
    FieldDef, FieldKind, Model, ModelDef, Post, RelationshipDecl, Tag,
};
use blog_db_rust::store::{MemoryStore, SchemaCatalog};
use blog_db_rust::BlogError;

#[tokio::test]
async fn test_bootstrap_creates_tables_then_junction() {
    let store = MemoryStore::new();

    let report = SchemaBootstrap::declared().run(&store).await.unwrap();

    assert_eq!(report.tables, vec!["post", "tag"]);
    assert_eq!(report.added_columns, 0);
    assert_eq!(report.junction_tables, vec!["post_tag"]);

    assert_eq!(
        store.table_columns("post").unwrap(),
        vec!["id", "title", "content", "status", "publishdate"]
    );
    assert_eq!(store.table_columns("tag").unwrap(), vec!["id", "label"]);
    assert_eq!(
        store.table_columns("post_tag").unwrap(),
        vec!["post_id", "tag_id"]
    );

    // Junction creation comes after both model tables
    let executed = store.executed_ddl();
    assert!(executed.last().unwrap().contains("\"post_tag\""));
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let store = MemoryStore::new();

    SchemaBootstrap::declared().run(&store).await.unwrap();
    let tables_after_first = store.table_names();

    let second = SchemaBootstrap::declared().run(&store).await.unwrap();
    assert_eq!(second.added_columns, 0);
    assert_eq!(store.table_names(), tables_after_first);

    // Only CREATE ... IF NOT EXISTS statements were issued, never an ALTER
    assert!(store
        .executed_ddl()
        .iter()
        .all(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS")));
}

#[tokio::test]
async fn test_create_twice_yields_one_table() {
    let store = MemoryStore::new();
    let table = describe(&Tag::MODEL).unwrap();

    SchemaSynchronizer::create(&store, &table).await.unwrap();
    SchemaSynchronizer::create(&store, &table).await.unwrap();

    assert_eq!(store.table_names(), vec!["tag"]);
}

#[tokio::test]
async fn test_migrate_adds_one_column_per_missing_field() {
    // Table created by an older build that had no status/publish date yet
    let store = MemoryStore::new().with_table("post", &["id", "title", "content"]);
    let table = describe(&Post::MODEL).unwrap();

    let applied = SchemaSynchronizer::migrate(&store, &table).await.unwrap();

    let added: Vec<&str> = applied
        .iter()
        .filter_map(|s| match s {
            Ddl::AddColumn { column, .. } => Some(column.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(added, vec!["status", "publishdate"]);
    assert_eq!(
        store.table_columns("post").unwrap(),
        vec!["id", "title", "content", "status", "publishdate"]
    );
}

#[tokio::test]
async fn test_migrate_is_noop_when_catalog_matches() {
    let store = MemoryStore::new().with_table("tag", &["id", "label"]);
    let table = describe(&Tag::MODEL).unwrap();

    let applied = SchemaSynchronizer::migrate(&store, &table).await.unwrap();

    assert!(applied.is_empty());
    assert!(store.executed_ddl().is_empty());
}

#[tokio::test]
async fn test_migrate_adds_unique_constraint_separately() {
    let store = MemoryStore::new().with_table("tag", &["id"]);
    let table = describe(&Tag::MODEL).unwrap();

    SchemaSynchronizer::migrate(&store, &table).await.unwrap();

    assert_eq!(
        store.executed_ddl(),
        vec![
            "ALTER TABLE \"tag\" ADD COLUMN \"label\" TEXT;".to_string(),
            "ALTER TABLE \"tag\" ADD CONSTRAINT \"tag_label_unique\" UNIQUE (\"label\");"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_migrate_never_drops_extra_columns() {
    let store = MemoryStore::new().with_table("tag", &["id", "label", "color"]);

    SchemaBootstrap::new(vec![Tag::MODEL], vec![])
        .run(&store)
        .await
        .unwrap();

    assert_eq!(
        store.table_columns("tag").unwrap(),
        vec!["id", "label", "color"]
    );
}

#[tokio::test]
async fn test_migrate_failure_stops_remaining_alterations() {
    // Migrating without the table present: the first ALTER fails and nothing else runs
    let store = MemoryStore::new();
    let table = describe(&Post::MODEL).unwrap();

    let err = SchemaSynchronizer::migrate(&store, &table).await.unwrap_err();

    assert_eq!(err.to_string().matches("storage error").count(), 1);
    match err {
        BlogError::Storage(message) => {
            assert!(message.starts_with("error executing query ALTER TABLE"));
            assert!(message.contains("ADD COLUMN \"id\""));
            assert!(message.ends_with("relation \"post\" does not exist"));
        }
        other => panic!("expected storage error, got {:?}", other),
    }
    assert!(store.executed_ddl().is_empty());
}

#[tokio::test]
async fn test_model_without_primary_key_aborts_bootstrap() {
    const FIELDS: &[FieldDef] = &[FieldDef::new("Body", FieldKind::Text)];
    let store = MemoryStore::new();

    let err = SchemaBootstrap::new(
        vec![ModelDef::record("Note", FIELDS), Tag::MODEL],
        vec![RelationshipDecl::new(["post", "tag"])],
    )
    .run(&store)
    .await
    .unwrap_err();

    assert!(matches!(err, BlogError::Descriptor(_)));
    assert!(store.table_names().is_empty());
}

#[tokio::test]
async fn test_malformed_relationship_aborts_after_model_tables() {
    let store = MemoryStore::new();

    let err = SchemaBootstrap::new(
        vec![Post::MODEL, Tag::MODEL],
        vec![RelationshipDecl::new(["post"])],
    )
    .run(&store)
    .await
    .unwrap_err();

    assert!(matches!(err, BlogError::Relation(_)));
    assert_eq!(store.table_names(), vec!["post", "tag"]);
}

#[tokio::test]
async fn test_junction_creation_does_not_require_referenced_tables() {
    let store = MemoryStore::new();

    let created = JoinTableBuilder::create_all(
        &store,
        &[RelationshipDecl::new(["author", "book"])],
    )
    .await
    .unwrap();

    assert_eq!(created[0].name, "author_book");
    assert_eq!(
        store.existing_columns("author_book").await.unwrap().len(),
        2
    );
}
