use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{FlashNotice, MaybeIdentity};
use crate::state::AppState;
use crate::views::filter::{filter_options, Filter, FilterOption};
use crate::views::post::render_cards;
use crate::views::{Html, Shell};

#[derive(Template)]
#[template(path = "pages/feed.html")]
pub struct FeedTemplate {
    pub shell: Shell,
    pub filters: Vec<FilterOption>,
    pub cards: Vec<String>,
    pub is_loading: bool,
    pub load_failed: bool,
}

#[derive(Deserialize, Default)]
pub struct FeedQuery {
    pub category: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    flash: FlashNotice,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    let filter = Filter::from_query(query.category.as_deref());
    let shell = Shell::load(&state.cache, identity.as_ref(), flash.take()).await;

    let posts = state.cache.posts(filter.scope()).await;
    let cards = match &posts.data {
        Some(posts) => render_cards(&state.cache, posts).await?,
        None => Vec::new(),
    };

    let template = FeedTemplate {
        shell,
        filters: filter_options(filter),
        cards,
        is_loading: posts.is_loading,
        load_failed: posts.data.is_none() && posts.error.is_some(),
    };
    Ok((flash.clear(), Html(template)).into_response())
}
