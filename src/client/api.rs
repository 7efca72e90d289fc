use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::middleware::actor::ACTOR_HEADER;
use crate::post::post_model::{ActorRef, PostView};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response; `message` is the server's error message,
    /// passed through unmodified.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("a mutation is already in flight for post {0}")]
    Busy(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Transport seam for the feed: the HTTP client implements it for real, the
/// tests with an in-memory double.
#[allow(async_fn_in_trait)]
pub trait PostApi {
    async fn fetch_posts(&self) -> Result<Vec<PostView>, ClientError>;
    async fn create_post(
        &self,
        actor: &ActorRef,
        title: &str,
        content: &str,
    ) -> Result<PostView, ClientError>;
    async fn toggle_like(&self, actor: &ActorRef, post_id: &str) -> Result<PostView, ClientError>;
    async fn add_comment(
        &self,
        actor: &ActorRef,
        post_id: &str,
        text: &str,
    ) -> Result<PostView, ClientError>;
}

// Success envelopes as produced by the post controller.
#[derive(Deserialize)]
struct PostsEnvelope {
    posts: Vec<PostView>,
}

#[derive(Deserialize)]
struct PostEnvelope {
    post: PostView,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// `PostApi` over HTTP. The actor identifier travels in the `userid` header
/// on every mutation, matching what the interaction service expects.
pub struct HttpPostApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpPostApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpPostApi {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let message = resp
            .json::<ErrorEnvelope>()
            .await
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl PostApi for HttpPostApi {
    async fn fetch_posts(&self) -> Result<Vec<PostView>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/posts", self.base_url))
            .send()
            .await?;
        Ok(Self::parse::<PostsEnvelope>(resp).await?.posts)
    }

    async fn create_post(
        &self,
        actor: &ActorRef,
        title: &str,
        content: &str,
    ) -> Result<PostView, ClientError> {
        let resp = self
            .http
            .post(format!("{}/posts", self.base_url))
            .header(ACTOR_HEADER, &actor.id)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await?;
        Ok(Self::parse::<PostEnvelope>(resp).await?.post)
    }

    async fn toggle_like(&self, actor: &ActorRef, post_id: &str) -> Result<PostView, ClientError> {
        let resp = self
            .http
            .post(format!("{}/posts/{}/like", self.base_url, post_id))
            .header(ACTOR_HEADER, &actor.id)
            .json(&json!({}))
            .send()
            .await?;
        Ok(Self::parse::<PostEnvelope>(resp).await?.post)
    }

    async fn add_comment(
        &self,
        actor: &ActorRef,
        post_id: &str,
        text: &str,
    ) -> Result<PostView, ClientError> {
        let resp = self
            .http
            .post(format!("{}/posts/{}/comment", self.base_url, post_id))
            .header(ACTOR_HEADER, &actor.id)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        Ok(Self::parse::<PostEnvelope>(resp).await?.post)
    }
}
