use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{FieldDef, FieldKind, Id, Model, ModelDef, RelationshipDecl};

pub const DEFAULT_POST_STATUS: &str = "Draft";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Id,
    pub label: String,
}

impl Model for Tag {
    const MODEL: ModelDef = ModelDef::record(
        "Tag",
        &[
            FieldDef::new("ID", FieldKind::Integer),
            FieldDef::new("Label", FieldKind::Text).unique(),
        ],
    );
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Id,
    pub title: String,
    pub content: String,
    /// Populated from the junction table on read, never stored as a column
    pub tags: Vec<Tag>,
    pub status: String,
    pub publish_date: Option<DateTime<Utc>>,
}

impl Model for Post {
    const MODEL: ModelDef = ModelDef::record(
        "Post",
        &[
            FieldDef::new("ID", FieldKind::Integer),
            FieldDef::new("Title", FieldKind::Text),
            FieldDef::new("Content", FieldKind::Text),
            FieldDef::new("Tags", FieldKind::Many),
            FieldDef::new("Status", FieldKind::Text),
            FieldDef::new("PublishDate", FieldKind::Timestamp),
        ],
    );
}

/// Tag reference inside a post payload. Only the label is used for resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagPayload {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub label: String,
}

/// Decoded body of a post create or update request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<TagPayload>,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "publish_dte")]
    pub publish_date: Option<DateTime<Utc>>,
}

impl PostPayload {
    pub fn labels(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.label.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTag {
    #[serde(default)]
    pub label: String,
}

/// Row values written by a post insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: String,
    pub publish_date: Option<DateTime<Utc>>,
}

impl NewPost {
    pub fn from_payload(payload: &PostPayload) -> Self {
        let status = if payload.status.is_empty() {
            DEFAULT_POST_STATUS.to_string()
        } else {
            payload.status.clone()
        };

        Self {
            title: payload.title.clone(),
            content: payload.content.clone(),
            status,
            publish_date: payload.publish_date,
        }
    }
}

/// Models synchronized at startup, in order.
pub fn declared_models() -> Vec<ModelDef> {
    vec![Post::MODEL, Tag::MODEL]
}

/// Many-to-many pairs materialized as junction tables at startup.
pub fn declared_relationships() -> Vec<RelationshipDecl> {
    vec![RelationshipDecl::new(["post", "tag"])]
}
