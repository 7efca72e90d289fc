use crate::database::DB_NAME;
use crate::post::post_model::{
    Comment, Post, PostView, build_view, newest_first, referenced_actors, validate_comment_text,
    validate_post_input,
};
use crate::user::model::User;
use crate::utils::error::ApiError;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{doc, oid::ObjectId, to_bson},
    options::ReturnDocument,
};
use std::collections::HashMap;

/// Durable storage for posts and their embedded likes/comments. Holds a
/// read-only handle on the users collection for the read-time username join.
pub struct PostService {
    posts: Collection<Post>,
    users: Collection<User>,
}

impl PostService {
    pub fn new(client: &Client) -> Self {
        let db = client.database(DB_NAME);
        PostService {
            posts: db.collection::<Post>("posts"),
            users: db.collection::<User>("users"),
        }
    }

    /// Insert a new post and hand back its resolved view (the author is
    /// populated the way the list endpoint would return it).
    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        author: ObjectId,
    ) -> Result<PostView, ApiError> {
        validate_post_input(title, content)?;

        let post = Post {
            id: ObjectId::new(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            author,
            likes: vec![],
            comments: vec![],
            created_at: Utc::now(),
        };

        self.posts
            .insert_one(&post)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to create post: {}", e)))?;

        self.resolve(post).await
    }

    /// All posts, most recent first, with authors, likers and comment authors
    /// resolved to usernames in one batched lookup.
    pub async fn list_posts(&self) -> Result<Vec<PostView>, ApiError> {
        let cursor = self
            .posts
            .find(doc! {})
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to fetch posts: {}", e)))?;

        let mut posts: Vec<Post> = cursor
            .try_collect()
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to collect posts: {}", e)))?;

        newest_first(&mut posts);

        let usernames = self.usernames_for(&referenced_actors(&posts)).await?;
        Ok(posts
            .into_iter()
            .map(|p| build_view(p, &usernames))
            .collect())
    }

    pub async fn find_post(&self, id: &str) -> Result<PostView, ApiError> {
        let post_id = parse_post_id(id)?;
        let post = self
            .posts
            .find_one(doc! { "_id": post_id })
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to fetch post: {}", e)))?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        self.resolve(post).await
    }

    /// Flip like membership for `actor` on one post. The whole flip runs as a
    /// single aggregation-pipeline update, so two concurrent toggles on the
    /// same document cannot interleave a read-modify-write window.
    pub async fn toggle_like(&self, id: &str, actor: ObjectId) -> Result<PostView, ApiError> {
        let post_id = parse_post_id(id)?;
        let update = vec![doc! {
            "$set": {
                "likes": {
                    "$cond": [
                        { "$in": [actor, { "$ifNull": ["$likes", []] }] },
                        { "$filter": {
                            "input": "$likes",
                            "as": "like",
                            "cond": { "$ne": ["$$like", actor] },
                        } },
                        { "$concatArrays": [{ "$ifNull": ["$likes", []] }, [actor]] },
                    ]
                }
            }
        }];

        let post = self
            .posts
            .find_one_and_update(doc! { "_id": post_id }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to update likes: {}", e)))?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        self.resolve(post).await
    }

    /// Append a comment with a server-assigned timestamp. Single atomic
    /// `$push`; comments are never removed.
    pub async fn add_comment(
        &self,
        id: &str,
        actor: ObjectId,
        text: &str,
    ) -> Result<PostView, ApiError> {
        let text = validate_comment_text(text)?;
        let post_id = parse_post_id(id)?;

        let comment = Comment {
            author: actor,
            text,
            created_at: Utc::now(),
        };
        let comment_bson = to_bson(&comment)
            .map_err(|e| ApiError::Storage(format!("Failed to encode comment: {}", e)))?;

        let post = self
            .posts
            .find_one_and_update(
                doc! { "_id": post_id },
                doc! { "$push": { "comments": comment_bson } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to add comment: {}", e)))?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        self.resolve(post).await
    }

    async fn resolve(&self, post: Post) -> Result<PostView, ApiError> {
        let usernames = self
            .usernames_for(&referenced_actors(std::slice::from_ref(&post)))
            .await?;
        Ok(build_view(post, &usernames))
    }

    async fn usernames_for(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashMap<ObjectId, String>, ApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self
            .users
            .find(doc! { "_id": { "$in": ids } })
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to fetch users: {}", e)))?;

        let users: Vec<User> = cursor
            .try_collect()
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to collect users: {}", e)))?;

        Ok(users
            .into_iter()
            .filter_map(|u| u.id.map(|id| (id, u.username)))
            .collect())
    }
}

/// A post id that does not parse cannot resolve to a post.
fn parse_post_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("Post not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_post_id_is_not_found() {
        assert!(matches!(
            parse_post_id("not-a-hex-id"),
            Err(ApiError::NotFound(_))
        ));
        let id = ObjectId::new();
        assert_eq!(parse_post_id(&id.to_hex()).unwrap(), id);
    }
}
