use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::BlogError;
use crate::logic::{AssociationSynchronizer, TagService};
use crate::model::{Id, NewTag, Post, PostPayload, Tag};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Id,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

pub fn status_for(err: &BlogError) -> StatusCode {
    match err {
        BlogError::Validation(_) => StatusCode::BAD_REQUEST,
        BlogError::NotFound(_) => StatusCode::NOT_FOUND,
        BlogError::Conflict(_) => StatusCode::CONFLICT,
        BlogError::Descriptor(_) | BlogError::Relation(_) | BlogError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: BlogError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_for(&err);
    if status.is_server_error() {
        log::error!("Request failed: {}", err);
    }
    (status, Json(ErrorResponse::new(&err.to_string())))
}

fn decode<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&format!(
                "Invalid request payload: {}",
                rejection.body_text()
            ))),
        )
    })
}

// Post handlers

pub async fn create_post<S: Store>(
    State(store): State<AppState<S>>,
    body: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let payload = decode(body)?;

    let id = AssociationSynchronizer::create_post(&*store, &payload)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn list_posts<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Post>>> {
    let posts = AssociationSynchronizer::list_posts(&*store)
        .await
        .map_err(error_response)?;

    Ok(Json(ListResponse {
        total: posts.len(),
        items: posts,
    }))
}

pub async fn get_post<S: Store>(
    State(store): State<AppState<S>>,
    Path(post_id): Path<Id>,
) -> ApiResult<Json<Post>> {
    AssociationSynchronizer::get_post(&*store, post_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_post<S: Store>(
    State(store): State<AppState<S>>,
    Path(post_id): Path<Id>,
    body: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let payload = decode(body)?;

    AssociationSynchronizer::update_post(&*store, post_id, &payload)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_post<S: Store>(
    State(store): State<AppState<S>>,
    Path(post_id): Path<Id>,
) -> ApiResult<Json<MessageResponse>> {
    AssociationSynchronizer::delete_post(&*store, post_id)
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: format!(
            "Post with ID {} and its relations deleted successfully",
            post_id
        ),
    }))
}

// Tag handlers

pub async fn create_tag<S: Store>(
    State(store): State<AppState<S>>,
    body: Result<Json<NewTag>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let tag = decode(body)?;

    let id = TagService::create(&*store, &tag.label)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn get_tag<S: Store>(
    State(store): State<AppState<S>>,
    Path(tag_id): Path<Id>,
) -> ApiResult<Json<Tag>> {
    TagService::get(&*store, tag_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_tag<S: Store>(
    State(store): State<AppState<S>>,
    Path(tag_id): Path<Id>,
    body: Result<Json<NewTag>, JsonRejection>,
) -> ApiResult<Json<Tag>> {
    let tag = decode(body)?;

    TagService::update(&*store, tag_id, &tag.label)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_tag<S: Store>(
    State(store): State<AppState<S>>,
    Path(tag_id): Path<Id>,
) -> ApiResult<Json<MessageResponse>> {
    AssociationSynchronizer::delete_tag(&*store, tag_id)
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: format!(
            "Tag with ID {} and its relations deleted successfully",
            tag_id
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&BlogError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BlogError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&BlogError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&BlogError::Storage("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
