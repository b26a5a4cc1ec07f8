use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};

use crate::backend::Principal;
use crate::cache::Mutation;
use crate::error::AppResult;
use crate::extractors::{FlashNotice, MaybeIdentity};
use crate::state::AppState;
use crate::views::forms::ProfileForm;
use crate::views::notice::redirect_with_notice;
use crate::views::{Html, Notice, Shell};

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub shell: Shell,
    pub principal: String,
    pub form: ProfileForm,
    /// Shown on the initial page only; rejected submissions skip the lookup.
    pub role: Option<&'static str>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(profile_page).post(save_profile))
}

async fn profile_page(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    flash: FlashNotice,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(redirect_with_notice(
            "/",
            &Notice::error("Please login to set up your profile"),
        ));
    };

    let form = state
        .cache
        .caller_profile(&caller)
        .await
        .data
        .flatten()
        .map(ProfileForm::from)
        .unwrap_or_default();
    let shell = Shell::load(&state.cache, Some(&caller), flash.take()).await;
    let role = state.cache.caller_role(&caller).await.data.map(|role| role.label());
    let page = ProfileTemplate {
        shell,
        principal: caller.to_string(),
        form,
        role,
    };
    Ok((flash.clear(), Html(page)).into_response())
}

async fn save_profile(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(redirect_with_notice(
            "/",
            &Notice::error("Please login to set up your profile"),
        ));
    };

    let profile = match form.validate() {
        Ok(profile) => profile,
        Err(e) => {
            let page = rejected(caller, form, Notice::error(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state.cache.mutate(&caller, &Mutation::SaveProfile(profile)).await {
        Ok(_) => Ok(redirect_with_notice("/", &Notice::success("Profile saved!"))),
        Err(_) => {
            let page = rejected(caller, form, Notice::error("Failed to save profile"));
            Ok((StatusCode::BAD_GATEWAY, page).into_response())
        }
    }
}

fn rejected(caller: Principal, form: ProfileForm, notice: Notice) -> Html<ProfileTemplate> {
    Html(ProfileTemplate {
        principal: caller.to_string(),
        shell: Shell::offline(Some(caller), Some(notice)),
        form,
        role: None,
    })
}
