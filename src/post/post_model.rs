use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::utils::error::ApiError;

/// A blog post as stored in MongoDB. `likes` carries set semantics (an actor
/// appears at most once) and `comments` is append-only in insertion order.
/// Title, content and author are immutable after creation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub author: ObjectId,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

/// Comment embedded in its parent post; no identity of its own.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    pub author: ObjectId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct LikeRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub text: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Display-friendly actor reference produced by the read-time join.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActorRef {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentView {
    pub author: ActorRef,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Wire representation of a post with every actor reference resolved to a
/// username. Shared verbatim by the client reconciliation layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: ActorRef,
    pub likes: Vec<ActorRef>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn liked_by(&self, actor_id: &str) -> bool {
        self.likes.iter().any(|l| l.id == actor_id)
    }

    /// Flip like membership for `actor`. Used for the client's optimistic
    /// guess; the server performs the same flip atomically on the document.
    pub fn toggle_like(&mut self, actor: &ActorRef) {
        if self.liked_by(&actor.id) {
            self.likes.retain(|l| l.id != actor.id);
        } else {
            self.likes.push(actor.clone());
        }
    }
}

pub fn validate_post_input(title: &str, content: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".to_string()));
    }
    Ok(())
}

pub fn validate_comment_text(text: &str) -> Result<String, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(
            "Comment text cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Most recent first. `sort_by` is stable, so posts sharing a timestamp keep
/// their fetch order.
pub fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn resolve_actor(id: &ObjectId, usernames: &HashMap<ObjectId, String>) -> ActorRef {
    ActorRef {
        id: id.to_hex(),
        username: usernames
            .get(id)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Read-time join of a stored post against the username map. Nothing is
/// denormalized into the posts collection.
pub fn build_view(post: Post, usernames: &HashMap<ObjectId, String>) -> PostView {
    PostView {
        id: post.id.to_hex(),
        title: post.title,
        content: post.content,
        author: resolve_actor(&post.author, usernames),
        likes: post
            .likes
            .iter()
            .map(|id| resolve_actor(id, usernames))
            .collect(),
        comments: post
            .comments
            .into_iter()
            .map(|c| CommentView {
                author: resolve_actor(&c.author, usernames),
                text: c.text,
                created_at: c.created_at,
            })
            .collect(),
        created_at: post.created_at,
    }
}

/// Every actor id referenced by a post: author, likes, comment authors.
pub fn referenced_actors(posts: &[Post]) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    for post in posts {
        ids.push(post.author);
        ids.extend(post.likes.iter().copied());
        ids.extend(post.comments.iter().map(|c| c.author));
    }
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post_at(ts: DateTime<Utc>, title: &str) -> Post {
        Post {
            id: ObjectId::new(),
            title: title.to_string(),
            content: "body".to_string(),
            author: ObjectId::new(),
            likes: vec![],
            comments: vec![],
            created_at: ts,
        }
    }

    #[test]
    fn rejects_empty_title_and_content() {
        assert!(matches!(
            validate_post_input("", "x"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_post_input("x", "   "),
            Err(ApiError::Validation(_))
        ));
        assert!(validate_post_input("T", "C").is_ok());
    }

    #[test]
    fn comment_text_is_trimmed_and_non_empty() {
        assert!(matches!(
            validate_comment_text("  \t "),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(validate_comment_text("  nice!  ").unwrap(), "nice!");
    }

    #[test]
    fn newest_first_orders_descending() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut posts = vec![post_at(t1, "old"), post_at(t2, "new")];
        newest_first(&mut posts);
        assert_eq!(posts[0].title, "new");
        assert_eq!(posts[1].title, "old");
    }

    #[test]
    fn newest_first_is_stable_for_equal_timestamps() {
        // Two posts sharing a truncated timestamp keep their fetch order.
        let t = Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap();
        let mut posts = vec![post_at(t, "first"), post_at(t, "second")];
        newest_first(&mut posts);
        assert_eq!(posts[0].title, "first");
        assert_eq!(posts[1].title, "second");
    }

    #[test]
    fn view_resolves_usernames_with_fallback() {
        let author = ObjectId::new();
        let liker = ObjectId::new();
        let mut post = post_at(Utc::now(), "T");
        post.author = author;
        post.likes.push(liker);
        post.comments.push(Comment {
            author,
            text: "hi".to_string(),
            created_at: Utc::now(),
        });

        let mut usernames = HashMap::new();
        usernames.insert(author, "ada".to_string());
        // liker is deliberately missing from the map

        let view = build_view(post, &usernames);
        assert_eq!(view.author.username, "ada");
        assert_eq!(view.likes[0].username, "unknown");
        assert_eq!(view.comments[0].author.username, "ada");
    }

    #[test]
    fn toggle_like_flips_membership() {
        let mut post = build_view(post_at(Utc::now(), "T"), &HashMap::new());
        let actor = ActorRef {
            id: ObjectId::new().to_hex(),
            username: "u2".to_string(),
        };
        post.toggle_like(&actor);
        assert!(post.liked_by(&actor.id));
        post.toggle_like(&actor);
        assert!(!post.liked_by(&actor.id));
        assert!(post.likes.is_empty());
    }

    #[test]
    fn referenced_actors_dedupes() {
        let author = ObjectId::new();
        let mut post = post_at(Utc::now(), "T");
        post.author = author;
        post.likes.push(author);
        let ids = referenced_actors(&[post]);
        assert_eq!(ids, vec![author]);
    }
}
