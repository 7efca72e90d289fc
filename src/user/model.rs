use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub privacy: bool,
    pub avatar: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a user looks like on the wire. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub privacy: bool,
    pub avatar: Option<String>,
    pub profile_picture: Option<String>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            privacy: self.privacy,
            avatar: self.avatar.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub id: String,
    pub username: Option<String>,
    pub privacy: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateAvatarRequest {
    pub id: String,
    pub avatar: String,
}
