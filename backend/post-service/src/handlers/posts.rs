/// Post handlers - HTTP endpoints for the feed, post lifecycle and likes
use crate::error::{AppError, Result};
use crate::middleware::{AuthenticatedUser, OptionalUser};
use crate::services::feed::parse_query_int;
use crate::services::{MediaInput, UploadedFile};
use crate::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Feed query parameters. `page` and `limit` are parsed leniently and fall
/// back to their defaults when they hold no number.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub include_author: Option<bool>,
}

/// Body of the like/dislike endpoints
#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub id: Uuid,
}

/// Fields read from a multipart post submission
#[derive(Debug, Default)]
struct PostForm {
    text: Option<String>,
    media: MediaInput,
}

/// List posts, newest first
pub async fn get_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let (page, limit) = state.feed.normalize(
        parse_query_int(query.page.as_deref()),
        parse_query_int(query.limit.as_deref()),
    );
    let feed = state
        .feed
        .list(page, limit, query.include_author.unwrap_or(true))
        .await?;

    Ok(HttpResponse::Ok().json(feed))
}

/// Create a new post from a multipart form (`text`, `file` or `url`)
pub async fn create_post(
    state: web::Data<AppState>,
    user: OptionalUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let author_id = match user.0 {
        Some(user) => Some(user.id),
        None if state.posts.policy().require_auth_for_posting => {
            return Err(AppError::Unauthenticated)
        }
        None => None,
    };

    let form = read_post_form(payload, state.media.max_upload_bytes).await?;
    let post = state
        .posts
        .create_post(form.text.as_deref(), &form.media, author_id)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.posts.get_post(*post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post. Author only.
pub async fn delete_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    state.posts.delete_post(*post_id, user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Post deleted successfully" })))
}

pub async fn like_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<LikeRequest>,
) -> Result<HttpResponse> {
    let post = state.likes.like(req.id, user.0.id).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn dislike_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<LikeRequest>,
) -> Result<HttpResponse> {
    let post = state.likes.dislike(req.id, user.0.id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Whether the caller currently likes the post
pub async fn liked_status(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let liked = state.likes.liked_status(*post_id, user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "liked": liked })))
}

async fn read_post_form(mut payload: Multipart, max_upload_bytes: usize) -> Result<PostForm> {
    let mut form = PostForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_default();
                let bytes = read_field(&mut field, max_upload_bytes).await?;
                form.media.file = Some(UploadedFile {
                    content_type,
                    bytes,
                });
            }
            "text" => form.text = Some(read_text_field(&mut field, max_upload_bytes).await?),
            "url" => form.media.url = Some(read_text_field(&mut field, max_upload_bytes).await?),
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
                read_field(&mut field, max_upload_bytes).await?;
            }
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "Upload exceeds the {} byte limit",
                max_bytes
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn read_text_field(field: &mut Field, max_bytes: usize) -> Result<String> {
    let bytes = read_field(field, max_bytes).await?;
    String::from_utf8(bytes)
        .map_err(|_| AppError::Validation("Form fields must be valid UTF-8".to_string()))
}

fn multipart_error(err: actix_multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart payload: {}", err))
}
