use std::collections::HashMap;

use itertools::Itertools;

use crate::error::{BlogError, Result};
use crate::model::{Id, NewPost, Post, PostPayload};
use crate::store::traits::Store;

/// Post write paths that keep the `post_tag` junction table in line with the payload.
///
/// Creation drops labels it cannot resolve; update rejects them before any
/// write. The two paths are deliberately not unified.
pub struct AssociationSynchronizer;

impl AssociationSynchronizer {
    /// Insert a post and one junction row per resolvable tag label.
    ///
    /// The post insert and each junction insert are separate statements. If a
    /// junction insert fails (the tag vanished after lookup) the error is
    /// returned and the rows written so far remain.
    pub async fn create_post<S: Store + ?Sized>(store: &S, payload: &PostPayload) -> Result<Id> {
        let labels = distinct_labels(payload);
        let resolved = store.tag_ids_for_labels(&labels).await?;

        let (known, unknown): (Vec<String>, Vec<String>) = labels
            .into_iter()
            .partition(|label| resolved.contains_key(label));
        if !unknown.is_empty() {
            log::debug!("Dropping unknown tag labels {:?}", unknown);
        }

        let post_id = store.insert_post(&NewPost::from_payload(payload)).await?;

        for label in &known {
            store
                .insert_post_tag_by_label(post_id, label)
                .await
                .inspect_err(|e| {
                    log::warn!(
                        "Post {} created but tag '{}' could not be attached: {}",
                        post_id,
                        label,
                        e
                    )
                })?;
        }

        Ok(post_id)
    }

    /// Apply a partial update: title/content overwrite, tags replace-all.
    ///
    /// Every label must already exist; otherwise nothing is written.
    /// Status and publish date are not touched.
    pub async fn update_post<S: Store + ?Sized>(
        store: &S,
        post_id: Id,
        payload: &PostPayload,
    ) -> Result<Post> {
        let tag_ids = store.all_tag_ids().await?;
        let resolved = resolve_all(&tag_ids, payload)?;

        let title = non_empty(&payload.title);
        let content = non_empty(&payload.content);

        if title.is_none() && content.is_none() && resolved.is_empty() {
            return Err(BlogError::Validation(
                "no valid fields to update".to_string(),
            ));
        }

        if !store.post_exists(post_id).await? {
            return Err(post_not_found(post_id));
        }

        if (title.is_some() || content.is_some())
            && !store.update_post_text(post_id, title, content).await?
        {
            return Err(post_not_found(post_id));
        }

        if !resolved.is_empty() {
            store.replace_post_tags(post_id, &resolved).await?;
        }

        Self::get_post(store, post_id).await
    }

    /// Post row plus its tags, re-joined from storage
    pub async fn get_post<S: Store + ?Sized>(store: &S, post_id: Id) -> Result<Post> {
        let mut post = store
            .get_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        post.tags = store.tags_for_post(post_id).await?;
        Ok(post)
    }

    pub async fn list_posts<S: Store + ?Sized>(store: &S) -> Result<Vec<Post>> {
        store.list_posts().await
    }

    /// Junction rows first, then the post row
    pub async fn delete_post<S: Store + ?Sized>(store: &S, post_id: Id) -> Result<()> {
        if !store.delete_post(post_id).await? {
            return Err(post_not_found(post_id));
        }
        Ok(())
    }

    /// Junction rows first, then the tag row
    pub async fn delete_tag<S: Store + ?Sized>(store: &S, tag_id: Id) -> Result<()> {
        if !store.delete_tag(tag_id).await? {
            return Err(BlogError::NotFound(format!("tag {} not found", tag_id)));
        }
        Ok(())
    }
}

fn distinct_labels(payload: &PostPayload) -> Vec<String> {
    payload.labels().into_iter().unique().collect()
}

fn resolve_all(tag_ids: &HashMap<String, Id>, payload: &PostPayload) -> Result<Vec<Id>> {
    distinct_labels(payload)
        .into_iter()
        .map(|label| {
            tag_ids
                .get(&label)
                .copied()
                .ok_or_else(|| BlogError::Validation(format!("Tag '{}' does not exist", label)))
        })
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn post_not_found(post_id: Id) -> BlogError {
    BlogError::NotFound(format!("post {} not found", post_id))
}
