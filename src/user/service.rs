use crate::database::DB_NAME;
use crate::user::model::{User, UserView};
use crate::utils::error::ApiError;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use mongodb::{
    Client, Collection,
    bson::{doc, oid::ObjectId},
    options::ReturnDocument,
};

/// Account management for the SafeQuest app: signup, signin and profile
/// updates. No tokens and no sessions are issued; callers identify themselves
/// on later requests by sending their id back (see `middleware::actor`).
pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<User>("users");
        UserService { collection }
    }

    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
        role: Option<String>,
    ) -> Result<UserView, ApiError> {
        if email.trim().is_empty() || username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email, username and password are required".to_string(),
            ));
        }

        let existing = self
            .collection
            .count_documents(doc! { "email": email })
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to check email: {}", e)))?;
        if existing > 0 {
            return Err(ApiError::Validation("User already exists".to_string()));
        }

        let hashed = hash(password, DEFAULT_COST)
            .map_err(|e| ApiError::Storage(format!("Failed to hash password: {}", e)))?;

        let mut user = User {
            id: None,
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: hashed,
            role: role.unwrap_or_else(|| "student".to_string()),
            privacy: false,
            avatar: None,
            profile_picture: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = self
            .collection
            .insert_one(&user)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to create user: {}", e)))?;

        user.id = result.inserted_id.as_object_id();
        Ok(user.view())
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<UserView, ApiError> {
        let user = self
            .collection
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to fetch user: {}", e)))?
            .ok_or_else(|| ApiError::Validation("Invalid email or password".to_string()))?;

        let matches = verify(password, &user.password)
            .map_err(|e| ApiError::Storage(format!("Failed to verify password: {}", e)))?;
        if !matches {
            return Err(ApiError::Validation("Invalid email or password".to_string()));
        }

        Ok(user.view())
    }

    pub async fn update_profile(
        &self,
        id: &str,
        username: Option<&str>,
        privacy: Option<bool>,
    ) -> Result<UserView, ApiError> {
        let user_id = parse_user_id(id)?;

        let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
        if let Some(name) = username {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                set.insert("username", trimmed);
            }
        }
        if let Some(privacy) = privacy {
            set.insert("privacy", privacy);
        }

        let user = self
            .collection
            .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to update user: {}", e)))?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user.view())
    }

    pub async fn update_avatar(&self, id: &str, avatar: &str) -> Result<UserView, ApiError> {
        let user_id = parse_user_id(id)?;

        let user = self
            .collection
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$set": { "avatar": avatar, "updated_at": Utc::now().to_rfc3339() } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to update avatar: {}", e)))?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user.view())
    }
}

fn parse_user_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id)
        .map_err(|_| ApiError::InvalidIdentifier(format!("Malformed user identifier: {}", id)))
}
