use crate::error::{BlogError, Result};
use crate::model::{Id, Tag};
use crate::store::traits::Store;

pub struct TagService;

impl TagService {
    pub async fn get<S: Store + ?Sized>(store: &S, id: Id) -> Result<Tag> {
        store
            .get_tag(id)
            .await?
            .ok_or_else(|| BlogError::NotFound(format!("tag {} not found", id)))
    }

    /// Insert a new label; an existing label is a conflict
    pub async fn create<S: Store + ?Sized>(store: &S, label: &str) -> Result<Id> {
        if label.is_empty() {
            return Err(BlogError::Validation("tag label is required".to_string()));
        }

        if store.find_tag_by_label(label).await?.is_some() {
            return Err(BlogError::Conflict(format!(
                "Cannot create tag because label '{}' already exists",
                label
            )));
        }

        store.insert_tag(label).await
    }

    pub async fn update<S: Store + ?Sized>(store: &S, id: Id, label: &str) -> Result<Tag> {
        if label.is_empty() {
            return Err(BlogError::Validation("tag label is required".to_string()));
        }

        if !store.update_tag(id, label).await? {
            return Err(BlogError::NotFound(format!("tag {} not found", id)));
        }

        Ok(Tag {
            id,
            label: label.to_string(),
        })
    }
}
