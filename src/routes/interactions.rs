//! htmx fragment endpoints for the like, rating and comment controls.
//!
//! A control that cannot proceed (signed out, invalid input, backend
//! failure) is answered with `204 No Content` and a toast, so htmx leaves the
//! control exactly as it was before the attempt.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::backend::{InvestmentRating, PostId};
use crate::cache::Mutation;
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeIdentity;
use crate::state::AppState;
use crate::views::forms::CommentForm;
use crate::views::notice::{notify, with_notice};
use crate::views::post::{
    render_comment_section, LikeButtonTemplate, LikeControlView, RatingBarTemplate,
    RatingBarView,
};
use crate::views::{Html, Notice};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LikeForm {
    /// State of the control when it was clicked.
    pub liked: bool,
}

#[derive(Deserialize)]
pub struct RatingForm {
    pub tier: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post/{post_id}/like", post(toggle_like))
        .route("/post/{post_id}/rating", post(add_rating))
        .route(
            "/post/{post_id}/comments",
            get(list_comments).post(add_comment),
        )
}

async fn toggle_like(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(post_id): Path<PostId>,
    Form(form): Form<LikeForm>,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(notify(Notice::error("Please login to like posts")));
    };

    let mutation = if form.liked {
        Mutation::UnlikePost(post_id)
    } else {
        Mutation::LikePost(post_id)
    };
    if state.cache.mutate(&caller, &mutation).await.is_err() {
        return Ok(notify(Notice::error("Failed to update like")));
    }

    // Counts come from the backend, never from local arithmetic.
    let like_count = state
        .cache
        .post(post_id)
        .await
        .data
        .flatten()
        .map(|post| post.like_count)
        .unwrap_or_default();

    Ok(Html(LikeButtonTemplate {
        like: LikeControlView {
            post_id,
            like_count,
            liked: !form.liked,
        },
    })
    .into_response())
}

async fn add_rating(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(post_id): Path<PostId>,
    Form(form): Form<RatingForm>,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(notify(Notice::error("Please login to rate posts")));
    };
    let rating = InvestmentRating::from_slug(&form.tier)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown rating tier: {}", form.tier)))?;

    let mutation = Mutation::AddRating { post_id, rating };
    if state.cache.mutate(&caller, &mutation).await.is_err() {
        return Ok(notify(Notice::error("Failed to record rating")));
    }

    let recorded = Notice::success("Investment interest recorded!");
    match state.cache.post(post_id).await.data.flatten() {
        Some(post) => Ok(with_notice(
            &recorded,
            Html(RatingBarTemplate {
                ratings: RatingBarView::for_post(&post),
            }),
        )),
        None => Ok(notify(recorded)),
    }
}

async fn list_comments(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(post_id): Path<PostId>,
) -> AppResult<Response> {
    let html =
        render_comment_section(&state.cache, post_id, identity.is_some(), String::new()).await?;
    Ok(axum::response::Html(html).into_response())
}

async fn add_comment(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(post_id): Path<PostId>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(notify(Notice::error("Please login to comment")));
    };
    let text = match form.validate() {
        Ok(text) => text,
        Err(e) => return Ok(notify(Notice::error(e.to_string()))),
    };

    let mutation = Mutation::AddComment { post_id, text };
    if state.cache.mutate(&caller, &mutation).await.is_err() {
        return Ok(notify(Notice::error("Failed to add comment")));
    }

    let html = render_comment_section(&state.cache, post_id, true, String::new()).await?;
    Ok(with_notice(
        &Notice::success("Comment added!"),
        axum::response::Html(html),
    ))
}
