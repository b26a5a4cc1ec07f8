use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::backend::{BackendError, PostId};
use crate::error::{AppError, AppResult};
use crate::extractors::{FlashNotice, MaybeIdentity};
use crate::state::AppState;
use crate::views::post::{
    render_comment_section, render_like, render_ratings, resolve_author, LikeControlView,
    PostDetailView,
};
use crate::views::{Html, Shell};

#[derive(Template)]
#[template(path = "pages/post_detail.html")]
pub struct PostDetailTemplate {
    pub shell: Shell,
    pub post: PostDetailView,
    pub ratings_html: String,
    pub like_html: String,
    pub comments_html: String,
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub shell: Shell,
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "pages/loading.html")]
pub struct LoadingTemplate {
    pub shell: Shell,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/post/{post_id}", get(post_detail_page))
}

/// Decimal digits only; anything else is not a post id.
pub fn parse_post_id(raw: &str) -> Option<PostId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

async fn post_detail_page(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    flash: FlashNotice,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let shell = Shell::load(&state.cache, identity.as_ref(), flash.take()).await;
    let Some(post_id) = parse_post_id(&raw_id) else {
        return not_found_page(shell, &flash, "Post not found");
    };

    let query = state.cache.post(post_id).await;
    let post = match query.data {
        Some(Some(post)) => post,
        Some(None) => return not_found_page(shell, &flash, "Post not found"),
        None if query.is_loading => {
            return Ok((flash.clear(), Html(LoadingTemplate { shell })).into_response());
        }
        None => {
            return Err(AppError::Backend(
                query.error.unwrap_or(BackendError::Unavailable),
            ));
        }
    };

    let author = resolve_author(&state.cache, &post.author).await;
    let comments_html =
        render_comment_section(&state.cache, post_id, shell.is_authenticated(), String::new())
            .await?;

    let template = PostDetailTemplate {
        ratings_html: render_ratings(&post)?,
        like_html: render_like(LikeControlView::fresh(&post))?,
        comments_html,
        post: PostDetailView::new(&post, author),
        shell,
    };
    Ok((flash.clear(), Html(template)).into_response())
}

pub(crate) fn not_found_page(
    shell: Shell,
    flash: &FlashNotice,
    title: &'static str,
) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        flash.clear(),
        Html(NotFoundTemplate { shell, title }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_ids_are_plain_decimal() {
        assert_eq!(parse_post_id("0"), Some(0));
        assert_eq!(parse_post_id("42"), Some(42));
        assert_eq!(parse_post_id("18446744073709551615"), Some(u64::MAX));
    }

    #[test]
    fn everything_else_is_rejected() {
        for raw in ["", "abc", "-1", "+1", "1.5", " 7", "0x10", "18446744073709551616"] {
            assert_eq!(parse_post_id(raw), None, "{raw:?}");
        }
    }
}
