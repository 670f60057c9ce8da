use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::logic::ddl::Ddl;
use crate::model::{Id, NewPost, Post, Tag};

/// Catalog introspection and DDL execution used by schema synchronization.
#[async_trait::async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Column names the live catalog reports for a table (empty when the table is absent)
    async fn existing_columns(&self, table: &str) -> Result<HashSet<String>>;
    async fn execute_ddl(&self, statement: &Ddl) -> Result<()>;
}

#[async_trait::async_trait]
pub trait TagStore: Send + Sync {
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>>;
    async fn find_tag_by_label(&self, label: &str) -> Result<Option<Tag>>;
    /// Batched label lookup; labels absent from storage are simply missing from the map
    async fn tag_ids_for_labels(&self, labels: &[String]) -> Result<HashMap<String, Id>>;
    /// Full label -> id map
    async fn all_tag_ids(&self) -> Result<HashMap<String, Id>>;
    async fn insert_tag(&self, label: &str) -> Result<Id>;
    async fn update_tag(&self, id: Id, label: &str) -> Result<bool>;
    /// Removes junction rows referencing the tag, then the tag row
    async fn delete_tag(&self, id: Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &NewPost) -> Result<Id>;
    /// Post row only; `tags` is left empty
    async fn get_post(&self, id: Id) -> Result<Option<Post>>;
    /// Every post with its tags, ordered by id
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn post_exists(&self, id: Id) -> Result<bool>;
    /// Overwrites title and/or content; `None` leaves the column as is
    async fn update_post_text(
        &self,
        id: Id,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<bool>;
    /// Removes junction rows referencing the post, then the post row
    async fn delete_post(&self, id: Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait PostTagStore: Send + Sync {
    /// Inserts one junction row, resolving the tag by label inside the statement
    async fn insert_post_tag_by_label(&self, post_id: Id, label: &str) -> Result<()>;
    /// Deletes every junction row of the post and inserts one per tag id
    async fn replace_post_tags(&self, post_id: Id, tag_ids: &[Id]) -> Result<()>;
    async fn tags_for_post(&self, post_id: Id) -> Result<Vec<Tag>>;
}

pub trait Store: SchemaCatalog + TagStore + PostStore + PostTagStore + Send + Sync {}
