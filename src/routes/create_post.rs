use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use crate::backend::Principal;
use crate::cache::{Mutation, MutationOutput};
use crate::error::AppResult;
use crate::extractors::{FlashNotice, MaybeIdentity};
use crate::state::AppState;
use crate::views::forms::{CategoryOption, CreatePostForm};
use crate::views::notice::redirect_with_notice;
use crate::views::{Html, Notice, Shell};

const LOGIN_REQUIRED: &str = "You must be logged in to create a post";

#[derive(Template)]
#[template(path = "pages/create_post.html")]
pub struct CreatePostTemplate {
    pub shell: Shell,
    pub form: CreatePostForm,
    pub categories: Vec<CategoryOption>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-post", get(create_post_page))
        .route("/posts", post(create_post))
}

async fn create_post_page(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    flash: FlashNotice,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(redirect_with_notice("/", &Notice::error(LOGIN_REQUIRED)));
    };

    let shell = Shell::load(&state.cache, Some(&caller), flash.take()).await;
    let page = form_page(shell, CreatePostForm::default());
    Ok((flash.clear(), Html(page)).into_response())
}

async fn create_post(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Form(form): Form<CreatePostForm>,
) -> AppResult<Response> {
    let Some(caller) = identity else {
        return Ok(redirect_with_notice("/", &Notice::error(LOGIN_REQUIRED)));
    };

    let new_post = match form.validate() {
        Ok(new_post) => new_post,
        Err(e) => {
            let page = rejected(caller, form, Notice::error(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state.cache.mutate(&caller, &Mutation::CreatePost(new_post)).await {
        Ok(output) => {
            if let MutationOutput::Created(post_id) = output {
                tracing::info!(post_id, "Created post");
            }
            Ok(redirect_with_notice(
                "/",
                &Notice::success("Post created successfully!"),
            ))
        }
        Err(_) => {
            let page = rejected(caller, form, Notice::error("Failed to create post"));
            Ok((StatusCode::BAD_GATEWAY, page).into_response())
        }
    }
}

fn form_page(shell: Shell, form: CreatePostForm) -> CreatePostTemplate {
    CreatePostTemplate {
        categories: form.category_options(),
        shell,
        form,
    }
}

/// Re-render the form with the entered values and `notice`.
fn rejected(caller: Principal, form: CreatePostForm, notice: Notice) -> Html<CreatePostTemplate> {
    Html(form_page(Shell::offline(Some(caller), Some(notice)), form))
}
