use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::error::AppResult;
use crate::extractors::{cookie_value, FlashNotice, MaybeIdentity};
use crate::state::AppState;
use crate::views::{Html, Notice, Shell};

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
    pub principal: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    /// Optional principal text; blank mints a fresh identity.
    pub principal: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

async fn login_page(
    MaybeIdentity(identity): MaybeIdentity,
    flash: FlashNotice,
) -> AppResult<Response> {
    if identity.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let page = LoginTemplate {
        shell: Shell::offline(None, flash.take()),
        principal: String::new(),
    };
    Ok((flash.clear(), Html(page)).into_response())
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let principal = match state.identity.login(Some(form.principal.as_str())) {
        Ok(principal) => principal,
        Err(e) => {
            tracing::warn!(error = %e, "Login rejected");
            let page = LoginTemplate {
                shell: Shell::offline(None, Some(Notice::error(e.to_string()))),
                principal: form.principal,
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    tracing::info!(principal = %principal, "Signed in");
    let token = state.sessions.lock().await.create(principal);
    let auth = &state.config.auth;

    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                session_cookie(&auth.cookie_name, &token, auth.session_ttl()),
            ),
            (
                header::SET_COOKIE,
                Notice::success("Logged in").set_cookie(),
            ),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = cookie_value(&headers, cookie_name) {
        if let Some(principal) = state.sessions.lock().await.remove(token) {
            tracing::info!(principal = %principal, "Signed out");
        }
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie(cookie_name))]),
        Redirect::to("/"),
    )
        .into_response())
}
