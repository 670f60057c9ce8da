use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::{BlogError, Result};
use crate::logic::ddl::{unique_constraint_name, Ddl};
use crate::model::{Id, NewPost, Post, Tag};
use crate::store::traits::{PostStore, PostTagStore, SchemaCatalog, Store, TagStore};

#[derive(Debug, Default)]
struct MemoryState {
    /// Catalog: table name -> column names in creation order
    tables: BTreeMap<String, Vec<String>>,
    constraints: HashSet<String>,
    executed: Vec<String>,
    posts: BTreeMap<Id, Post>,
    tags: BTreeMap<Id, Tag>,
    /// (post_id, tag_id) in insertion order; the pair is the primary key
    post_tags: Vec<(Id, Id)>,
    last_post_id: Id,
    last_tag_id: Id,
}

impl MemoryState {
    fn tag_id(&self, label: &str) -> Option<Id> {
        self.tags.values().find(|t| t.label == label).map(|t| t.id)
    }

    fn tags_for_post(&self, post_id: Id) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| self.tags.get(t).cloned())
            .collect();
        tags.sort_by_key(|t| t.id);
        tags
    }

    fn apply(&mut self, statement: &Ddl) -> Result<()> {
        match statement {
            Ddl::CreateTable(table) => {
                self.tables
                    .entry(table.name.clone())
                    .or_insert_with(|| table.columns.iter().map(|c| c.name.clone()).collect());
            }
            Ddl::AddColumn { table, column } => {
                let columns = self.tables.get_mut(table).ok_or_else(|| {
                    BlogError::storage(format!("relation \"{}\" does not exist", table))
                })?;
                if columns.contains(&column.name) {
                    return Err(BlogError::storage(format!(
                        "column \"{}\" of relation \"{}\" already exists",
                        column.name, table
                    )));
                }
                columns.push(column.name.clone());
            }
            Ddl::AddUniqueConstraint { table, column } => {
                let columns = self.tables.get(table).ok_or_else(|| {
                    BlogError::storage(format!("relation \"{}\" does not exist", table))
                })?;
                if !columns.contains(column) {
                    return Err(BlogError::storage(format!(
                        "column \"{}\" named in key does not exist",
                        column
                    )));
                }
                let name = unique_constraint_name(table, column);
                if !self.constraints.insert(name.clone()) {
                    return Err(BlogError::storage(format!(
                        "relation \"{}\" already exists",
                        name
                    )));
                }
            }
            Ddl::CreateJunctionTable(junction) => {
                self.tables
                    .entry(junction.name.clone())
                    .or_insert_with(|| junction.key_columns());
            }
        }
        Ok(())
    }
}

/// In-process store with the same observable behavior as [`super::PostgresStore`].
///
/// DDL is interpreted against an in-memory catalog and every executed
/// statement is recorded, which makes it suitable for exercising schema
/// synchronization and the association write paths without a server.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the catalog with a table as if an older build had created it
    pub fn with_table(self, name: &str, columns: &[&str]) -> Self {
        self.state.write().tables.insert(
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn table_columns(&self, name: &str) -> Option<Vec<String>> {
        self.state.read().tables.get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.state.read().tables.keys().cloned().collect()
    }

    /// SQL text of every successfully executed DDL statement, in order
    pub fn executed_ddl(&self) -> Vec<String> {
        self.state.read().executed.clone()
    }

    pub fn post_tag_rows(&self) -> Vec<(Id, Id)> {
        self.state.read().post_tags.clone()
    }
}

#[async_trait::async_trait]
impl SchemaCatalog for MemoryStore {
    async fn existing_columns(&self, table: &str) -> Result<HashSet<String>> {
        Ok(self
            .state
            .read()
            .tables
            .get(table)
            .map(|columns| columns.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn execute_ddl(&self, statement: &Ddl) -> Result<()> {
        let mut state = self.state.write();
        state.apply(statement)?;
        state.executed.push(statement.to_sql());
        Ok(())
    }
}

#[async_trait::async_trait]
impl TagStore for MemoryStore {
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>> {
        Ok(self.state.read().tags.get(&id).cloned())
    }

    async fn find_tag_by_label(&self, label: &str) -> Result<Option<Tag>> {
        Ok(self
            .state
            .read()
            .tags
            .values()
            .find(|t| t.label == label)
            .cloned())
    }

    async fn tag_ids_for_labels(&self, labels: &[String]) -> Result<HashMap<String, Id>> {
        let state = self.state.read();
        Ok(labels
            .iter()
            .filter_map(|label| state.tag_id(label).map(|id| (label.clone(), id)))
            .collect())
    }

    async fn all_tag_ids(&self) -> Result<HashMap<String, Id>> {
        Ok(self
            .state
            .read()
            .tags
            .values()
            .map(|t| (t.label.clone(), t.id))
            .collect())
    }

    async fn insert_tag(&self, label: &str) -> Result<Id> {
        let mut state = self.state.write();
        if state.tag_id(label).is_some() {
            return Err(BlogError::Conflict(format!(
                "duplicate key value violates unique constraint on label '{}'",
                label
            )));
        }

        state.last_tag_id += 1;
        let id = state.last_tag_id;
        state.tags.insert(
            id,
            Tag {
                id,
                label: label.to_string(),
            },
        );
        Ok(id)
    }

    async fn update_tag(&self, id: Id, label: &str) -> Result<bool> {
        let mut state = self.state.write();
        if state.tag_id(label).is_some_and(|existing| existing != id) {
            return Err(BlogError::Conflict(format!(
                "duplicate key value violates unique constraint on label '{}'",
                label
            )));
        }

        Ok(match state.tags.get_mut(&id) {
            Some(tag) => {
                tag.label = label.to_string();
                true
            }
            None => false,
        })
    }

    async fn delete_tag(&self, id: Id) -> Result<bool> {
        let mut state = self.state.write();
        state.post_tags.retain(|(_, t)| *t != id);
        Ok(state.tags.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &NewPost) -> Result<Id> {
        let mut state = self.state.write();
        state.last_post_id += 1;
        let id = state.last_post_id;
        state.posts.insert(
            id,
            Post {
                id,
                title: post.title.clone(),
                content: post.content.clone(),
                tags: Vec::new(),
                status: post.status.clone(),
                publish_date: post.publish_date,
            },
        );
        Ok(id)
    }

    async fn get_post(&self, id: Id) -> Result<Option<Post>> {
        Ok(self.state.read().posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let state = self.state.read();
        Ok(state
            .posts
            .values()
            .map(|post| Post {
                tags: state.tags_for_post(post.id),
                ..post.clone()
            })
            .collect())
    }

    async fn post_exists(&self, id: Id) -> Result<bool> {
        Ok(self.state.read().posts.contains_key(&id))
    }

    async fn update_post_text(
        &self,
        id: Id,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<bool> {
        let mut state = self.state.write();
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(false);
        };

        if let Some(title) = title {
            post.title = title.to_string();
        }
        if let Some(content) = content {
            post.content = content.to_string();
        }
        Ok(true)
    }

    async fn delete_post(&self, id: Id) -> Result<bool> {
        let mut state = self.state.write();
        state.post_tags.retain(|(p, _)| *p != id);
        Ok(state.posts.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl PostTagStore for MemoryStore {
    async fn insert_post_tag_by_label(&self, post_id: Id, label: &str) -> Result<()> {
        let mut state = self.state.write();
        let tag_id = state.tag_id(label).ok_or_else(|| {
            BlogError::storage("null value in column \"tag_id\" violates not-null constraint")
        })?;
        if !state.posts.contains_key(&post_id) {
            return Err(BlogError::storage(format!(
                "insert on table \"post_tag\" violates foreign key: post {} is not present",
                post_id
            )));
        }
        if state.post_tags.contains(&(post_id, tag_id)) {
            return Err(BlogError::Conflict(format!(
                "duplicate key value violates post_tag primary key ({}, {})",
                post_id, tag_id
            )));
        }

        state.post_tags.push((post_id, tag_id));
        Ok(())
    }

    async fn replace_post_tags(&self, post_id: Id, tag_ids: &[Id]) -> Result<()> {
        let mut state = self.state.write();
        if let Some(missing) = tag_ids.iter().find(|id| !state.tags.contains_key(*id)) {
            return Err(BlogError::storage(format!(
                "insert on table \"post_tag\" violates foreign key: tag {} is not present",
                missing
            )));
        }

        state.post_tags.retain(|(p, _)| *p != post_id);
        for tag_id in tag_ids {
            if !state.post_tags.contains(&(post_id, *tag_id)) {
                state.post_tags.push((post_id, *tag_id));
            }
        }
        Ok(())
    }

    async fn tags_for_post(&self, post_id: Id) -> Result<Vec<Tag>> {
        Ok(self.state.read().tags_for_post(post_id))
    }
}

impl Store for MemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnSpec;

    #[tokio::test]
    async fn test_add_column_to_missing_table_fails() {
        let store = MemoryStore::new();
        let statement = Ddl::AddColumn {
            table: "post".to_string(),
            column: ColumnSpec {
                name: "title".to_string(),
                sql_type: "TEXT".to_string(),
                is_primary: false,
                is_unique: false,
            },
        };

        assert!(store.execute_ddl(&statement).await.is_err());
        assert!(store.executed_ddl().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_label_is_conflict() {
        let store = MemoryStore::new();
        store.insert_tag("rust").await.unwrap();
        let err = store.insert_tag("rust").await.unwrap_err();
        assert!(matches!(err, BlogError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_tag_removes_junction_rows() {
        let store = MemoryStore::new();
        let tag = store.insert_tag("go").await.unwrap();
        let post = store
            .insert_post(&NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                status: "Draft".to_string(),
                publish_date: None,
            })
            .await
            .unwrap();
        store.insert_post_tag_by_label(post, "go").await.unwrap();

        assert!(store.delete_tag(tag).await.unwrap());
        assert!(store.post_tag_rows().is_empty());
        assert!(store.tags_for_post(post).await.unwrap().is_empty());
    }
}
