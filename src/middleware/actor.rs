use actix_web::HttpRequest;
use mongodb::bson::oid::ObjectId;

use crate::utils::error::ApiError;

/// Header carrying the acting user's identifier when it is not in the body.
pub const ACTOR_HEADER: &str = "userid";

/// Resolve the acting user for a mutation. The identifier comes from the
/// request body's `userId` field first, then the `userid` header. There is no
/// session or token state: the caller supplies the identifier on every call,
/// and a malformed value is rejected rather than coerced.
pub fn resolve_actor(req: &HttpRequest, body_user_id: Option<&str>) -> Result<ObjectId, ApiError> {
    let raw = body_user_id
        .map(str::to_owned)
        .or_else(|| {
            req.headers()
                .get(ACTOR_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        })
        .ok_or_else(|| {
            ApiError::AuthenticationRequired("No actor identifier supplied".to_string())
        })?;

    ObjectId::parse_str(raw.trim())
        .map_err(|_| ApiError::InvalidIdentifier(format!("Malformed actor identifier: {}", raw)))
}
