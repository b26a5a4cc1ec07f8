pub mod assets;
pub mod auth;
pub mod create_post;
pub mod feed;
pub mod interactions;
pub mod post_detail;
pub mod profile;

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::AppResult;
use crate::extractors::{FlashNotice, MaybeIdentity};
use crate::state::AppState;
use crate::views::Shell;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(feed::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(create_post::router())
        .merge(post_detail::router())
        .merge(interactions::router())
        .merge(profile::router())
        .merge(auth::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    flash: FlashNotice,
) -> AppResult<Response> {
    let shell = Shell::load(&state.cache, identity.as_ref(), flash.take()).await;
    post_detail::not_found_page(shell, &flash, "Page not found")
}
