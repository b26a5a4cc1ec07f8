//! Typed client for the backend actor.
//!
//! Every capability of the actor interface is one method on [`Backend`]. The
//! client is a pass-through: it never caches and never retries. Caching lives
//! in [`crate::cache`].

pub mod http;
pub mod memory;
pub mod types;

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use types::{
    Category, Comment, InvestmentRating, NewPost, Post, PostId, Principal, UserProfile, UserRole,
    VirtualPrototype,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Actor not available")]
    Unavailable,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{method} rejected ({status}): {message}")]
    Rejected {
        method: String,
        status: u16,
        message: String,
    },

    #[error("Could not decode {method} response: {message}")]
    Decode { method: String, message: String },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The backend actor interface.
///
/// `caller` is the identity the call is made on behalf of; `None` is an
/// anonymous call.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn add_comment(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
        text: &str,
    ) -> BackendResult<()>;

    async fn add_investment_rating(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
        rating: InvestmentRating,
    ) -> BackendResult<()>;

    async fn create_post(&self, caller: Option<&Principal>, post: &NewPost)
        -> BackendResult<PostId>;

    async fn get_all_posts(&self, caller: Option<&Principal>) -> BackendResult<Vec<Post>>;

    async fn get_posts_by_category(
        &self,
        caller: Option<&Principal>,
        category: Category,
    ) -> BackendResult<Vec<Post>>;

    async fn get_post(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<Option<Post>>;

    async fn get_comments(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<Vec<Comment>>;

    async fn like_post(&self, caller: Option<&Principal>, post_id: PostId) -> BackendResult<()>;

    async fn unlike_post(&self, caller: Option<&Principal>, post_id: PostId)
        -> BackendResult<()>;

    async fn get_caller_user_profile(
        &self,
        caller: Option<&Principal>,
    ) -> BackendResult<Option<UserProfile>>;

    async fn save_caller_user_profile(
        &self,
        caller: Option<&Principal>,
        profile: &UserProfile,
    ) -> BackendResult<()>;

    async fn get_user_profile(
        &self,
        caller: Option<&Principal>,
        user: &Principal,
    ) -> BackendResult<Option<UserProfile>>;

    async fn get_caller_user_role(&self, caller: Option<&Principal>) -> BackendResult<UserRole>;

    async fn is_caller_admin(&self, caller: Option<&Principal>) -> BackendResult<bool>;

    async fn assign_caller_user_role(
        &self,
        caller: Option<&Principal>,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()>;
}

/// Slot holding the backend once it has been initialized.
#[derive(Clone, Default)]
pub struct ActorHandle {
    inner: Arc<RwLock<Option<Arc<dyn Backend>>>>,
}

impl ActorHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ready(backend: Arc<dyn Backend>) -> Self {
        let handle = Self::empty();
        handle.install(backend);
        handle
    }

    pub fn install(&self, backend: Arc<dyn Backend>) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(backend);
        tracing::info!("Backend actor initialized");
    }

    pub fn get(&self) -> Option<Arc<dyn Backend>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.get().is_some()
    }
}
