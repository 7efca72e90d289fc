use crate::middleware::actor::resolve_actor;
use crate::post::post_model::{CommentRequest, CreatePostRequest, LikeRequest};
use crate::post::post_service::PostService;
use crate::utils::error::ApiError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

/// GET /posts: every post, newest first, actor references resolved.
pub async fn list_posts(post_service: web::Data<PostService>) -> Result<HttpResponse, ApiError> {
    let posts = post_service.list_posts().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts fetched successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "count": posts.len(),
        "posts": posts,
    })))
}

/// POST /posts: create a post. The actor identifier is required and becomes
/// the immutable author; identity is checked before the body is validated
/// against storage.
pub async fn create_post(
    req: HttpRequest,
    post_service: web::Data<PostService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let author = resolve_actor(&req, body.user_id.as_deref())?;
    let post = post_service
        .create_post(&body.title, &body.content, author)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "post": post,
    })))
}

/// GET /posts/{id}
pub async fn get_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let post = post_service.find_post(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post fetched successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "post": post,
    })))
}

/// POST /posts/{id}/like: flip like membership for the acting user.
pub async fn like_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    body: Option<web::Json<LikeRequest>>,
) -> Result<HttpResponse, ApiError> {
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let actor = resolve_actor(&req, body.user_id.as_deref())?;
    let post = post_service
        .toggle_like(&post_id.into_inner(), actor)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post likes updated",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "post": post,
    })))
}

/// POST /posts/{id}/comment: append a comment for the acting user.
pub async fn comment_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = resolve_actor(&req, body.user_id.as_deref())?;
    let post = post_service
        .add_comment(&post_id.into_inner(), actor, &body.text)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment added successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "post": post,
    })))
}
