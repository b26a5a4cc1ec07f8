use askama::Template;

use super::format::{
    author_name, card_date, comment_date, detail_date, initials, DisplayTime,
};
use super::render;
use crate::backend::{Category, Comment, InvestmentRating, Post, PostId, Principal};
use crate::cache::QueryCache;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorView {
    pub name: String,
    pub initials: String,
}

impl AuthorView {
    pub fn from_name(name: String) -> Self {
        let initials = initials(&name);
        Self { name, initials }
    }
}

/// Look up the public profile of `author`. Failures render as "Anonymous".
pub async fn resolve_author(cache: &QueryCache, author: &Principal) -> AuthorView {
    let profile = cache.user_profile(author).await.data.flatten();
    AuthorView::from_name(author_name(profile.as_ref()))
}

pub struct CategoryBadge {
    pub label: &'static str,
    pub class: &'static str,
}

impl From<Category> for CategoryBadge {
    fn from(category: Category) -> Self {
        Self {
            label: category.label(),
            class: category.badge_class(),
        }
    }
}

/// Heart button. `liked` is local to the rendered control; every page load
/// starts unliked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeControlView {
    pub post_id: PostId,
    pub like_count: u64,
    pub liked: bool,
}

impl LikeControlView {
    pub fn fresh(post: &Post) -> Self {
        Self {
            post_id: post.id,
            like_count: post.like_count,
            liked: false,
        }
    }
}

pub struct RatingTierView {
    pub slug: &'static str,
    pub label: &'static str,
    pub range: &'static str,
    pub icon: &'static str,
    pub count: u64,
}

pub struct RatingBarView {
    pub post_id: PostId,
    pub tiers: Vec<RatingTierView>,
}

impl RatingBarView {
    pub fn for_post(post: &Post) -> Self {
        let tiers = InvestmentRating::ALL
            .into_iter()
            .map(|rating| RatingTierView {
                slug: rating.slug(),
                label: rating.label(),
                range: rating.price_range(),
                icon: rating.icon(),
                count: post.rating_count(rating),
            })
            .collect();
        Self {
            post_id: post.id,
            tiers,
        }
    }
}

pub struct PostCardView {
    pub href: String,
    pub title: String,
    pub description: String,
    pub badge: CategoryBadge,
    pub author: AuthorView,
    pub date: DisplayTime,
    pub image_url: Option<String>,
}

impl PostCardView {
    pub fn new(post: &Post, author: AuthorView) -> Self {
        Self {
            href: format!("/post/{}", post.id),
            title: post.title.clone(),
            description: post.description.clone(),
            badge: post.category.into(),
            author,
            date: card_date(post.timestamp),
            image_url: post
                .virtual_prototype
                .as_ref()
                .and_then(|p| non_empty(&p.image_url)),
        }
    }
}

pub struct PostDetailView {
    pub title: String,
    pub description: String,
    pub badge: CategoryBadge,
    pub author: AuthorView,
    pub date: DisplayTime,
    pub prototype_description: Option<String>,
    pub prototype_image: Option<String>,
}

impl PostDetailView {
    pub fn new(post: &Post, author: AuthorView) -> Self {
        let prototype = post.virtual_prototype.as_ref();
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            badge: post.category.into(),
            author,
            date: detail_date(post.timestamp),
            prototype_description: prototype.and_then(|p| non_empty(&p.description)),
            prototype_image: prototype.and_then(|p| non_empty(&p.image_url)),
        }
    }

    pub fn has_prototype(&self) -> bool {
        self.prototype_description.is_some() || self.prototype_image.is_some()
    }
}

pub struct CommentView {
    pub author: AuthorView,
    pub text: String,
    pub date: DisplayTime,
}

pub struct CommentSectionView {
    pub post_id: PostId,
    pub is_authenticated: bool,
    pub draft: String,
    /// `None` when the list could not be loaded.
    pub comments: Option<Vec<CommentView>>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Template)]
#[template(path = "components/like_button.html")]
pub struct LikeButtonTemplate {
    pub like: LikeControlView,
}

#[derive(Template)]
#[template(path = "components/rating_bar.html")]
pub struct RatingBarTemplate {
    pub ratings: RatingBarView,
}

#[derive(Template)]
#[template(path = "components/post_card.html")]
pub struct PostCardTemplate {
    pub card: PostCardView,
    pub ratings_html: String,
    pub like_html: String,
}

#[derive(Template)]
#[template(path = "components/comment_section.html")]
pub struct CommentSectionTemplate {
    pub section: CommentSectionView,
}

pub fn render_like(like: LikeControlView) -> AppResult<String> {
    render(&LikeButtonTemplate { like })
}

pub fn render_ratings(post: &Post) -> AppResult<String> {
    render(&RatingBarTemplate {
        ratings: RatingBarView::for_post(post),
    })
}

pub async fn render_card(cache: &QueryCache, post: &Post) -> AppResult<String> {
    let author = resolve_author(cache, &post.author).await;
    render(&PostCardTemplate {
        card: PostCardView::new(post, author),
        ratings_html: render_ratings(post)?,
        like_html: render_like(LikeControlView::fresh(post))?,
    })
}

/// Render every card, resolving authors concurrently.
pub async fn render_cards(cache: &QueryCache, posts: &[Post]) -> AppResult<Vec<String>> {
    futures::future::try_join_all(posts.iter().map(|post| render_card(cache, post))).await
}

async fn comment_view(cache: &QueryCache, comment: &Comment) -> CommentView {
    CommentView {
        author: resolve_author(cache, &comment.author).await,
        text: comment.text.clone(),
        date: comment_date(comment.timestamp),
    }
}

pub async fn comment_section(
    cache: &QueryCache,
    post_id: PostId,
    is_authenticated: bool,
    draft: String,
) -> CommentSectionView {
    let comments = match cache.comments(post_id).await.data {
        Some(comments) => Some(
            futures::future::join_all(comments.iter().map(|c| comment_view(cache, c))).await,
        ),
        None => None,
    };
    CommentSectionView {
        post_id,
        is_authenticated,
        draft,
        comments,
    }
}

pub async fn render_comment_section(
    cache: &QueryCache,
    post_id: PostId,
    is_authenticated: bool,
    draft: String,
) -> AppResult<String> {
    let section = comment_section(cache, post_id, is_authenticated, draft).await;
    render(&CommentSectionTemplate { section })
}
