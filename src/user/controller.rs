use crate::user::model::{SigninRequest, SignupRequest, UpdateAvatarRequest, UpdateProfileRequest};
use crate::user::service::UserService;
use crate::utils::error::ApiError;
use actix_web::{HttpResponse, web};
use serde_json::json;

pub async fn signup(
    user_service: web::Data<UserService>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = user_service
        .signup(&body.email, &body.username, &body.password, body.role.clone())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User created successfully",
        "httpStatusCode": 201,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "user": user,
        "isNewUser": true,
    })))
}

pub async fn signin(
    user_service: web::Data<UserService>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = user_service.signin(&body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Signed in successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "user": user,
    })))
}

pub async fn update_profile(
    user_service: web::Data<UserService>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = user_service
        .update_profile(&body.id, body.username.as_deref(), body.privacy)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User updated successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "user": user,
    })))
}

pub async fn update_avatar(
    user_service: web::Data<UserService>,
    body: web::Json<UpdateAvatarRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = user_service.update_avatar(&body.id, &body.avatar).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Avatar updated successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "avatar": user.avatar,
    })))
}
