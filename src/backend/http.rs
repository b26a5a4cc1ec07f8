use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use super::{
    Backend, BackendError, BackendResult, Category, Comment, InvestmentRating, NewPost, Post,
    PostId, Principal, UserProfile, UserRole,
};

/// Header carrying the caller's principal on every RPC.
pub const CALLER_HEADER: &str = "x-caller-principal";

/// JSON-over-HTTP transport to the backend actor gateway.
///
/// Each operation is `POST {base_url}/rpc/{method}` with the positional
/// arguments as a JSON array. The response body is the JSON-encoded return
/// value; an empty body decodes as `null`.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> BackendResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| BackendError::Transport(e.to_string()))?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn call<R: DeserializeOwned>(
        &self,
        caller: Option<&Principal>,
        method: &'static str,
        args: Value,
    ) -> BackendResult<R> {
        let url = self
            .base_url
            .join(&format!("rpc/{}", method))
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let mut request = self.client.post(url).json(&args);
        if let Some(caller) = caller {
            request = request.header(CALLER_HEADER, caller.as_str());
        }

        tracing::debug!(method, "Calling backend");
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(method, status = status.as_u16(), "Backend rejected call");
            return Err(BackendError::Rejected {
                method: method.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

        serde_json::from_slice(body).map_err(|e| BackendError::Decode {
            method: method.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn add_comment(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
        text: &str,
    ) -> BackendResult<()> {
        self.call(caller, "addComment", json!([post_id, text])).await
    }

    async fn add_investment_rating(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
        rating: InvestmentRating,
    ) -> BackendResult<()> {
        self.call(caller, "addInvestmentRating", json!([post_id, rating]))
            .await
    }

    async fn create_post(
        &self,
        caller: Option<&Principal>,
        post: &NewPost,
    ) -> BackendResult<PostId> {
        let args = json!([
            post.title,
            post.description,
            post.category,
            post.virtual_prototype
        ]);
        self.call(caller, "createPost", args).await
    }

    async fn get_all_posts(&self, caller: Option<&Principal>) -> BackendResult<Vec<Post>> {
        self.call(caller, "getAllPosts", json!([])).await
    }

    async fn get_posts_by_category(
        &self,
        caller: Option<&Principal>,
        category: Category,
    ) -> BackendResult<Vec<Post>> {
        self.call(caller, "getPostsByCategory", json!([category]))
            .await
    }

    async fn get_post(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<Option<Post>> {
        self.call(caller, "getPost", json!([post_id])).await
    }

    async fn get_comments(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<Vec<Comment>> {
        self.call(caller, "getComments", json!([post_id])).await
    }

    async fn like_post(&self, caller: Option<&Principal>, post_id: PostId) -> BackendResult<()> {
        self.call(caller, "likePost", json!([post_id])).await
    }

    async fn unlike_post(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<()> {
        self.call(caller, "unlikePost", json!([post_id])).await
    }

    async fn get_caller_user_profile(
        &self,
        caller: Option<&Principal>,
    ) -> BackendResult<Option<UserProfile>> {
        self.call(caller, "getCallerUserProfile", json!([])).await
    }

    async fn save_caller_user_profile(
        &self,
        caller: Option<&Principal>,
        profile: &UserProfile,
    ) -> BackendResult<()> {
        self.call(caller, "saveCallerUserProfile", json!([profile]))
            .await
    }

    async fn get_user_profile(
        &self,
        caller: Option<&Principal>,
        user: &Principal,
    ) -> BackendResult<Option<UserProfile>> {
        self.call(caller, "getUserProfile", json!([user])).await
    }

    async fn get_caller_user_role(&self, caller: Option<&Principal>) -> BackendResult<UserRole> {
        self.call(caller, "getCallerUserRole", json!([])).await
    }

    async fn is_caller_admin(&self, caller: Option<&Principal>) -> BackendResult<bool> {
        self.call(caller, "isCallerAdmin", json!([])).await
    }

    async fn assign_caller_user_role(
        &self,
        caller: Option<&Principal>,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()> {
        self.call(caller, "assignCallerUserRole", json!([user, role]))
            .await
    }
}
