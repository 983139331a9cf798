//! `SeaORM` implementation of the `PostService` trait.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::db::{Comment, Post, Store, User};
use crate::domain::validation::validate_caption;
use crate::domain::{AppEvent, Paged, Pagination};
use crate::services::media::{MediaKind, MediaService};
use crate::services::post_service::{CommentView, LikeState, PostError, PostService, PostView};
use crate::services::user_service::{UserSummary, summarize};

/// Author summaries keyed by user id.
pub(crate) async fn load_authors(
    store: &Store,
    media: &MediaService,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, UserSummary>, PostError> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users: Vec<User> = store.user_repo().get_by_ids(&ids).await?;
    let mut authors = HashMap::with_capacity(users.len());
    for user in &users {
        authors.insert(user.id, summarize(media, user).await);
    }
    Ok(authors)
}

fn missing_author(user_id: i32) -> UserSummary {
    UserSummary {
        id: user_id,
        name: String::new(),
        username: None,
        image: None,
    }
}

pub(crate) async fn comment_views(
    store: &Store,
    media: &MediaService,
    comments: Vec<Comment>,
) -> Result<Vec<CommentView>, PostError> {
    let authors = load_authors(store, media, comments.iter().map(|c| c.user_id)).await?;

    Ok(comments
        .into_iter()
        .map(|c| CommentView {
            id: c.id,
            post_id: c.post_id,
            author: authors
                .get(&c.user_id)
                .cloned()
                .unwrap_or_else(|| missing_author(c.user_id)),
            text: c.text,
            created_at: c.created_at,
        })
        .collect())
}

pub struct SeaOrmPostService {
    store: Store,
    media: Arc<MediaService>,
    event_bus: broadcast::Sender<AppEvent>,
}

impl SeaOrmPostService {
    #[must_use]
    pub const fn new(
        store: Store,
        media: Arc<MediaService>,
        event_bus: broadcast::Sender<AppEvent>,
    ) -> Self {
        Self {
            store,
            media,
            event_bus,
        }
    }

    async fn find_post(&self, post_id: i32) -> Result<Post, PostError> {
        self.store
            .post_repo()
            .get(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))
    }

    /// Builds views for a batch of posts with one query per related table.
    async fn views(&self, posts: Vec<Post>, viewer: Option<i32>) -> Result<Vec<PostView>, PostError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let authors = load_authors(&self.store, &self.media, posts.iter().map(|p| p.user_id)).await?;

        let likes = self.store.like_repo();
        let comments = self.store.comment_repo();
        let liked = async {
            match viewer {
                Some(viewer_id) => likes.liked_by(viewer_id, &ids).await,
                None => Ok(HashSet::new()),
            }
        };
        let (like_counts, comment_counts, liked) =
            futures::try_join!(likes.counts_for(&ids), comments.counts_for(&ids), liked)?;

        let image_urls = futures::future::join_all(
            posts
                .iter()
                .map(|p| self.media.display_url(&p.image_url, Some(&p.image_key))),
        )
        .await;

        let mut views = Vec::with_capacity(posts.len());
        for (post, image_url) in posts.into_iter().zip(image_urls) {
            views.push(PostView {
                id: post.id,
                author: authors
                    .get(&post.user_id)
                    .cloned()
                    .unwrap_or_else(|| missing_author(post.user_id)),
                caption: post.caption,
                image_url,
                likes_count: like_counts.get(&post.id).copied().unwrap_or(0),
                liked: liked.contains(&post.id),
                comments_count: comment_counts.get(&post.id).copied().unwrap_or(0),
                created_at: post.created_at,
                updated_at: post.updated_at,
                comments: None,
            });
        }
        Ok(views)
    }

    async fn view(&self, post: Post, viewer: Option<i32>) -> Result<PostView, PostError> {
        let post_id = post.id;
        self.views(vec![post], viewer)
            .await?
            .pop()
            .ok_or(PostError::NotFound(post_id))
    }

    async fn paged_views(
        &self,
        rows: Vec<Post>,
        viewer: Option<i32>,
        pagination: Pagination,
    ) -> Result<Paged<PostView>, PostError> {
        let page = Paged::from_overfetch(rows, pagination);
        let items = self.views(page.items, viewer).await?;
        Ok(Paged {
            items,
            page: page.page,
            limit: page.limit,
            has_more: page.has_more,
        })
    }

    fn ensure_owner(post: &Post, user_id: i32, action: &str) -> Result<(), PostError> {
        if post.user_id != user_id {
            return Err(PostError::Forbidden(format!(
                "You can only {action} your own posts"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PostService for SeaOrmPostService {
    async fn create(
        &self,
        user_id: i32,
        caption: &str,
        image_key: &str,
    ) -> Result<PostView, PostError> {
        let caption = validate_caption(caption)?;
        let image_key = image_key.trim();
        if image_key.is_empty() {
            return Err(PostError::Validation("An image is required".to_string()));
        }
        self.media.ensure_owned(user_id, MediaKind::Post, image_key)?;

        let image_url = self.media.object_url(image_key);
        let post = self
            .store
            .post_repo()
            .create(user_id, &caption, &image_url, image_key)
            .await?;

        info!(post_id = post.id, user_id, "Post created");
        let _ = self.event_bus.send(AppEvent::PostCreated {
            post_id: post.id,
            user_id,
        });

        self.view(post, Some(user_id)).await
    }

    async fn get(&self, post_id: i32, viewer: Option<i32>) -> Result<PostView, PostError> {
        let post = self.find_post(post_id).await?;
        let comments = self.store.comment_repo().list_for_post(post_id).await?;

        let mut view = self.view(post, viewer).await?;
        view.comments = Some(comment_views(&self.store, &self.media, comments).await?);
        Ok(view)
    }

    async fn update_caption(
        &self,
        post_id: i32,
        user_id: i32,
        caption: &str,
    ) -> Result<PostView, PostError> {
        let post = self.find_post(post_id).await?;
        Self::ensure_owner(&post, user_id, "edit")?;

        let caption = validate_caption(caption)?;
        let updated = self
            .store
            .post_repo()
            .update_caption(post_id, &caption)
            .await?
            .ok_or(PostError::NotFound(post_id))?;

        self.view(updated, Some(user_id)).await
    }

    async fn delete(&self, post_id: i32, user_id: i32) -> Result<(), PostError> {
        let post = self.find_post(post_id).await?;
        Self::ensure_owner(&post, user_id, "delete")?;

        if !self.store.post_repo().delete(post_id).await? {
            return Err(PostError::NotFound(post_id));
        }

        self.media.schedule_delete(post.image_key);

        info!(post_id, user_id, "Post deleted");
        let _ = self.event_bus.send(AppEvent::PostDeleted { post_id, user_id });
        Ok(())
    }

    async fn explore(
        &self,
        viewer: Option<i32>,
        pagination: Pagination,
    ) -> Result<Paged<PostView>, PostError> {
        let rows = self.store.post_repo().list_recent(pagination).await?;
        self.paged_views(rows, viewer, pagination).await
    }

    async fn user_posts(
        &self,
        username: &str,
        viewer: Option<i32>,
        pagination: Pagination,
    ) -> Result<Paged<PostView>, PostError> {
        let user = self
            .store
            .user_repo()
            .get_by_username(&username.to_lowercase())
            .await?
            .ok_or_else(|| PostError::UserNotFound(username.to_string()))?;

        let rows = self
            .store
            .post_repo()
            .list_by_authors(&[user.id], pagination)
            .await?;
        self.paged_views(rows, viewer, pagination).await
    }

    async fn feed(
        &self,
        user_id: i32,
        pagination: Pagination,
    ) -> Result<Paged<PostView>, PostError> {
        let mut authors = self.store.follow_repo().following_ids(user_id).await?;
        authors.push(user_id);

        let rows = self
            .store
            .post_repo()
            .list_by_authors(&authors, pagination)
            .await?;
        self.paged_views(rows, Some(user_id), pagination).await
    }

    async fn toggle_like(&self, post_id: i32, user_id: i32) -> Result<LikeState, PostError> {
        self.find_post(post_id).await?;

        let likes = self.store.like_repo();
        let liked = likes.toggle(post_id, user_id).await?;
        let likes_count = likes.count(post_id).await?;

        Ok(LikeState { liked, likes_count })
    }

    async fn likers(
        &self,
        post_id: i32,
        pagination: Pagination,
    ) -> Result<Paged<UserSummary>, PostError> {
        self.find_post(post_id).await?;

        let rows = self.store.like_repo().likers(post_id, pagination).await?;
        let page = Paged::from_overfetch(rows, pagination);
        let authors = load_authors(&self.store, &self.media, page.items.iter().copied()).await?;

        Ok(page.map(|id| authors.get(&id).cloned().unwrap_or_else(|| missing_author(id))))
    }
}
