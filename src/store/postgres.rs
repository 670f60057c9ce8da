use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{Connection, PgConnection, PgPool, Row};

use crate::error::{BlogError, Result};
use crate::logic::ddl::{quote_ident, Ddl};
use crate::model::{Id, NewPost, Post, Tag};
use crate::store::traits::{PostStore, PostTagStore, SchemaCatalog, Store, TagStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from discrete connect options
    pub async fn new(options: PgConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                BlogError::storage(format!("Failed to create PostgreSQL connection pool: {}", e))
            })?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the target database when the server does not have it yet.
    ///
    /// `server` must not name a database. Returns whether the database was created.
    pub async fn ensure_database(server: &PgConnectOptions, dbname: &str) -> Result<bool> {
        let mut conn = PgConnection::connect_with(server).await.map_err(|e| {
            BlogError::storage(format!("error connecting to PostgreSQL: {}", e))
        })?;

        // A failed lookup is treated as "absent"; the CREATE below reports the real problem
        let exists = match sqlx::query("SELECT 1 FROM pg_database WHERE datname = $1")
            .bind(dbname)
            .fetch_optional(&mut conn)
            .await
        {
            Ok(row) => row.is_some(),
            Err(e) => {
                log::warn!("Could not check whether database {} exists: {}", dbname, e);
                false
            }
        };

        if !exists {
            let sql = format!("CREATE DATABASE {}", quote_ident(dbname));
            sqlx::query(&sql)
                .execute(&mut conn)
                .await
                .map_err(|e| BlogError::storage(format!("error creating database: {}", e)))?;
            log::info!("Created database {}", dbname);
        }

        conn.close().await?;
        Ok(!exists)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn tag_from_row(row: &PgRow) -> std::result::Result<Tag, sqlx::Error> {
    Ok(Tag {
        id: row.try_get("id")?,
        label: row.try_get::<Option<String>, _>("label")?.unwrap_or_default(),
    })
}

fn post_from_row(row: &PgRow) -> std::result::Result<Post, sqlx::Error> {
    let publish_date: Option<NaiveDateTime> = row.try_get("publishdate")?;

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
        content: row.try_get::<Option<String>, _>("content")?.unwrap_or_default(),
        tags: Vec::new(),
        status: row.try_get::<Option<String>, _>("status")?.unwrap_or_default(),
        publish_date: publish_date.map(|d| d.and_utc()),
    })
}

#[async_trait::async_trait]
impl SchemaCatalog for PostgresStore {
    async fn existing_columns(&self, table: &str) -> Result<HashSet<String>> {
        let rows = sqlx::query(
            "SELECT column_name::text AS column_name FROM information_schema.columns WHERE table_name = $1",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("column_name").map_err(Into::into))
            .collect()
    }

    async fn execute_ddl(&self, statement: &Ddl) -> Result<()> {
        let sql = statement.to_sql();
        log::debug!("Executing query: {}", sql);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TagStore for PostgresStore {
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, label FROM tag WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tag_from_row).transpose()?)
    }

    async fn find_tag_by_label(&self, label: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, label FROM tag WHERE label = $1")
            .bind(label)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tag_from_row).transpose()?)
    }

    async fn tag_ids_for_labels(&self, labels: &[String]) -> Result<HashMap<String, Id>> {
        if labels.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query("SELECT id, label FROM tag WHERE label = ANY($1)")
            .bind(labels)
            .fetch_all(&self.pool)
            .await?;

        let mut ids = HashMap::with_capacity(rows.len());
        for row in &rows {
            let tag = tag_from_row(row)?;
            ids.insert(tag.label, tag.id);
        }
        Ok(ids)
    }

    async fn all_tag_ids(&self) -> Result<HashMap<String, Id>> {
        let rows = sqlx::query("SELECT id, label FROM tag")
            .fetch_all(&self.pool)
            .await?;

        let mut ids = HashMap::with_capacity(rows.len());
        for row in &rows {
            let tag = tag_from_row(row)?;
            ids.insert(tag.label, tag.id);
        }
        Ok(ids)
    }

    async fn insert_tag(&self, label: &str) -> Result<Id> {
        let row = sqlx::query("INSERT INTO tag (label) VALUES ($1) RETURNING id")
            .bind(label)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("id")?)
    }

    async fn update_tag(&self, id: Id, label: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE tag SET label = $1 WHERE id = $2")
            .bind(label)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_tag(&self, id: Id) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_tag WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM tag WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl PostStore for PostgresStore {
    async fn insert_post(&self, post: &NewPost) -> Result<Id> {
        let row = sqlx::query(
            r#"
            INSERT INTO post (title, content, status, publishdate)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.status)
        .bind(post.publish_date.map(|d| d.naive_utc()))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn get_post(&self, id: Id) -> Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, title, content, status, publishdate FROM post WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(post_from_row).transpose()?)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.title, p.content, p.status, p.publishdate, t.id AS tag_id, t.label
            FROM post p
            LEFT JOIN post_tag pt ON p.id = pt.post_id
            LEFT JOIN tag t ON pt.tag_id = t.id
            ORDER BY p.id, t.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut posts: Vec<Post> = Vec::new();
        for row in &rows {
            let post_id: Id = row.try_get("id")?;
            if posts.last().map(|p| p.id) != Some(post_id) {
                posts.push(post_from_row(row)?);
            }

            let tag_id: Option<Id> = row.try_get("tag_id")?;
            if let (Some(tag_id), Some(post)) = (tag_id, posts.last_mut()) {
                post.tags.push(Tag {
                    id: tag_id,
                    label: row.try_get::<Option<String>, _>("label")?.unwrap_or_default(),
                });
            }
        }

        Ok(posts)
    }

    async fn post_exists(&self, id: Id) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM post WHERE id = $1) AS found")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("found")?)
    }

    async fn update_post_text(
        &self,
        id: Id,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE post SET title = COALESCE($1, title), content = COALESCE($2, content) WHERE id = $3",
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Id) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_tag WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM post WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl PostTagStore for PostgresStore {
    async fn insert_post_tag_by_label(&self, post_id: Id, label: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO post_tag (post_id, tag_id) VALUES ($1, (SELECT id FROM tag WHERE label = $2))",
        )
        .bind(post_id)
        .bind(label)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn replace_post_tags(&self, post_id: Id, tag_ids: &[Id]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_tag WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO post_tag (post_id, tag_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tags_for_post(&self, post_id: Id) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT tag.id, tag.label
            FROM tag
            INNER JOIN post_tag ON tag.id = post_tag.tag_id
            WHERE post_tag.post_id = $1
            ORDER BY tag.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(tag_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl Store for PostgresStore {}
