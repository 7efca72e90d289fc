use chrono::Utc;
use std::collections::HashSet;

use crate::client::api::{ClientError, PostApi};
use crate::post::post_model::{ActorRef, CommentView, PostView};

/// Local cached view of the post feed for one acting user.
///
/// Likes and comments are applied optimistically: the local guess goes in
/// first, then the request; a success is reconciled by refetching the
/// canonical list, a failure restores the exact pre-mutation snapshot and
/// surfaces the server's error untouched. The forward/backward pair lives
/// once in `begin`/`finish` instead of being hand-written per action.
///
/// Mutations on one post are serialized: while a request for a post is in
/// flight, a second mutation on it is rejected with `ClientError::Busy`.
pub struct PostFeed<A: PostApi> {
    api: A,
    actor: ActorRef,
    posts: Vec<PostView>,
    in_flight: HashSet<String>,
}

impl<A: PostApi> PostFeed<A> {
    pub fn new(api: A, actor: ActorRef) -> Self {
        PostFeed {
            api,
            actor,
            posts: Vec::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn posts(&self) -> &[PostView] {
        &self.posts
    }

    /// Replace the cache with the server's canonical list.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.posts = self.api.fetch_posts().await?;
        Ok(())
    }

    /// Not optimistic: new posts only appear once the server confirms them.
    pub async fn create_post(&mut self, title: &str, content: &str) -> Result<(), ClientError> {
        self.api.create_post(&self.actor, title, content).await?;
        self.refresh().await
    }

    pub async fn toggle_like(&mut self, post_id: &str) -> Result<(), ClientError> {
        let snapshot = self.begin(post_id)?;

        let actor = self.actor.clone();
        if let Some(post) = self.post_mut(post_id) {
            post.toggle_like(&actor);
        }

        let outcome = self.api.toggle_like(&self.actor, post_id).await;
        self.finish(post_id, snapshot, outcome).await
    }

    pub async fn add_comment(&mut self, post_id: &str, text: &str) -> Result<(), ClientError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let snapshot = self.begin(post_id)?;

        let guess = CommentView {
            author: self.actor.clone(),
            text: text.trim().to_string(),
            // Local guess; the canonical refetch replaces it with the
            // server-assigned timestamp.
            created_at: Utc::now(),
        };
        if let Some(post) = self.post_mut(post_id) {
            post.comments.push(guess);
        }

        let outcome = self.api.add_comment(&self.actor, post_id, text).await;
        self.finish(post_id, snapshot, outcome).await
    }

    /// Reject overlapping mutations on the same post and capture the exact
    /// pre-mutation state. `None` when the post is not cached locally: the
    /// optimistic step is then a no-op and the server has the only say.
    fn begin(&mut self, post_id: &str) -> Result<Option<PostView>, ClientError> {
        if self.in_flight.contains(post_id) {
            return Err(ClientError::Busy(post_id.to_string()));
        }
        self.in_flight.insert(post_id.to_string());
        Ok(self.posts.iter().find(|p| p.id == post_id).cloned())
    }

    /// Confirmed: canonical refetch. Reverted: the snapshot is restored
    /// verbatim and the error is handed to the caller. A refetch failure
    /// after a confirmed mutation keeps the optimistic state.
    async fn finish(
        &mut self,
        post_id: &str,
        snapshot: Option<PostView>,
        outcome: Result<PostView, ClientError>,
    ) -> Result<(), ClientError> {
        self.in_flight.remove(post_id);
        match outcome {
            Ok(_) => self.refresh().await,
            Err(err) => {
                if let Some(prev) = snapshot {
                    if let Some(slot) = self.posts.iter_mut().find(|p| p.id == post_id) {
                        *slot = prev;
                    }
                }
                Err(err)
            }
        }
    }

    fn post_mut(&mut self, post_id: &str) -> Option<&mut PostView> {
        self.posts.iter_mut().find(|p| p.id == post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use std::cell::{Cell, RefCell};

    fn actor(name: &str) -> ActorRef {
        ActorRef {
            id: ObjectId::new().to_hex(),
            username: name.to_string(),
        }
    }

    /// In-memory stand-in for the server: applies the same semantics the
    /// post service would, or fails on demand.
    struct MockApi {
        server: RefCell<Vec<PostView>>,
        fail_next: Cell<bool>,
    }

    impl MockApi {
        fn new(posts: Vec<PostView>) -> Self {
            MockApi {
                server: RefCell::new(posts),
                fail_next: Cell::new(false),
            }
        }

        fn check_fail(&self) -> Result<(), ClientError> {
            if self.fail_next.take() {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Storage Error: boom".to_string(),
                });
            }
            Ok(())
        }

        fn with_post<T>(
            &self,
            post_id: &str,
            f: impl FnOnce(&mut PostView) -> T,
        ) -> Result<T, ClientError> {
            let mut server = self.server.borrow_mut();
            let post = server
                .iter_mut()
                .find(|p| p.id == post_id)
                .ok_or_else(|| ClientError::Api {
                    status: 404,
                    message: "Not Found: Post not found".to_string(),
                })?;
            Ok(f(post))
        }
    }

    impl PostApi for MockApi {
        async fn fetch_posts(&self) -> Result<Vec<PostView>, ClientError> {
            self.check_fail()?;
            Ok(self.server.borrow().clone())
        }

        async fn create_post(
            &self,
            actor: &ActorRef,
            title: &str,
            content: &str,
        ) -> Result<PostView, ClientError> {
            self.check_fail()?;
            let post = PostView {
                id: ObjectId::new().to_hex(),
                title: title.to_string(),
                content: content.to_string(),
                author: actor.clone(),
                likes: vec![],
                comments: vec![],
                created_at: Utc::now(),
            };
            self.server.borrow_mut().insert(0, post.clone());
            Ok(post)
        }

        async fn toggle_like(
            &self,
            actor: &ActorRef,
            post_id: &str,
        ) -> Result<PostView, ClientError> {
            self.check_fail()?;
            self.with_post(post_id, |post| {
                post.toggle_like(actor);
                post.clone()
            })
        }

        async fn add_comment(
            &self,
            actor: &ActorRef,
            post_id: &str,
            text: &str,
        ) -> Result<PostView, ClientError> {
            self.check_fail()?;
            self.with_post(post_id, |post| {
                post.comments.push(CommentView {
                    author: actor.clone(),
                    text: text.trim().to_string(),
                    created_at: Utc::now(),
                });
                post.clone()
            })
        }
    }

    fn seeded_feed() -> (PostFeed<MockApi>, String) {
        let author = actor("ada");
        let post = PostView {
            id: ObjectId::new().to_hex(),
            title: "T".to_string(),
            content: "C".to_string(),
            author,
            likes: vec![],
            comments: vec![],
            created_at: Utc::now(),
        };
        let id = post.id.clone();
        (PostFeed::new(MockApi::new(vec![post]), actor("u2")), id)
    }

    #[actix_web::test]
    async fn create_round_trip_starts_empty() {
        let (mut feed, _) = seeded_feed();
        feed.create_post("Hello", "World").await.unwrap();

        let created = &feed.posts()[0];
        assert_eq!(created.title, "Hello");
        assert_eq!(created.author.username, "u2");
        assert!(created.likes.is_empty());
        assert!(created.comments.is_empty());
    }

    #[actix_web::test]
    async fn like_toggles_are_their_own_inverse() {
        let (mut feed, id) = seeded_feed();
        feed.refresh().await.unwrap();

        for round in 1..=4u32 {
            feed.toggle_like(&id).await.unwrap();
            let likes = &feed.posts()[0].likes;
            if round % 2 == 1 {
                assert_eq!(likes.len(), 1, "round {}", round);
                assert_eq!(likes[0].username, "u2");
            } else {
                assert!(likes.is_empty(), "round {}", round);
            }
        }
    }

    #[actix_web::test]
    async fn comment_appends_at_the_end() {
        let (mut feed, id) = seeded_feed();
        feed.refresh().await.unwrap();

        feed.add_comment(&id, "nice!").await.unwrap();
        assert_eq!(feed.posts()[0].comments.len(), 1);

        feed.add_comment(&id, "again").await.unwrap();
        let comments = &feed.posts()[0].comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments.last().unwrap().text, "again");
        assert_eq!(comments.last().unwrap().author.username, "u2");
    }

    #[actix_web::test]
    async fn failed_mutation_rolls_back_exactly() {
        let (mut feed, id) = seeded_feed();
        feed.refresh().await.unwrap();
        let before = feed.posts().to_vec();

        feed.api.fail_next.set(true);
        let err = feed.toggle_like(&id).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(feed.posts(), &before[..]);
        assert!(feed.in_flight.is_empty());
    }

    #[actix_web::test]
    async fn comment_on_unknown_post_is_not_found_and_leaves_cache_alone() {
        let (mut feed, _) = seeded_feed();
        feed.refresh().await.unwrap();
        let before = feed.posts().to_vec();

        let missing = ObjectId::new().to_hex();
        let err = feed.add_comment(&missing, "hello?").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(feed.posts(), &before[..]);
    }

    #[actix_web::test]
    async fn second_mutation_on_in_flight_post_is_rejected() {
        let (mut feed, id) = seeded_feed();
        feed.refresh().await.unwrap();
        let before = feed.posts().to_vec();

        feed.in_flight.insert(id.clone());
        let err = feed.toggle_like(&id).await.unwrap_err();
        assert!(matches!(err, ClientError::Busy(_)));
        assert_eq!(feed.posts(), &before[..]);
    }

    #[actix_web::test]
    async fn empty_comment_is_dropped_locally() {
        let (mut feed, id) = seeded_feed();
        feed.refresh().await.unwrap();

        feed.add_comment(&id, "   ").await.unwrap();
        assert!(feed.posts()[0].comments.is_empty());
    }
}
