use crate::backend::{
    Backend, BackendError, BackendResult, InvestmentRating, NewPost, PostId, Principal,
    UserProfile,
};

use super::{Invalidation, QueryCache, QueryKey, QueryKind};

/// A write the frontend can ask the backend to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreatePost(NewPost),
    AddComment { post_id: PostId, text: String },
    LikePost(PostId),
    UnlikePost(PostId),
    AddRating {
        post_id: PostId,
        rating: InvestmentRating,
    },
    SaveProfile(UserProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutput {
    Done,
    Created(PostId),
}

impl Mutation {
    /// Backend method this mutation maps to.
    pub fn method(&self) -> &'static str {
        match self {
            Mutation::CreatePost(_) => "createPost",
            Mutation::AddComment { .. } => "addComment",
            Mutation::LikePost(_) => "likePost",
            Mutation::UnlikePost(_) => "unlikePost",
            Mutation::AddRating { .. } => "addInvestmentRating",
            Mutation::SaveProfile(_) => "saveCallerUserProfile",
        }
    }

    /// Every cached read whose data this mutation could have changed.
    pub fn invalidations(&self, caller: &Principal) -> Vec<Invalidation> {
        match self {
            Mutation::CreatePost(_) => vec![Invalidation::Kind(QueryKind::Posts)],
            Mutation::AddComment { post_id, .. } => {
                vec![Invalidation::Key(QueryKey::Comments(*post_id))]
            }
            Mutation::LikePost(post_id)
            | Mutation::UnlikePost(post_id)
            | Mutation::AddRating { post_id, .. } => vec![
                Invalidation::Kind(QueryKind::Posts),
                Invalidation::Key(QueryKey::Post(*post_id)),
            ],
            Mutation::SaveProfile(_) => vec![
                Invalidation::Key(QueryKey::CallerProfile(caller.clone())),
                Invalidation::Key(QueryKey::UserProfile(caller.clone())),
            ],
        }
    }

    async fn execute(
        &self,
        backend: &dyn Backend,
        caller: &Principal,
    ) -> BackendResult<MutationOutput> {
        let caller = Some(caller);
        match self {
            Mutation::CreatePost(post) => backend
                .create_post(caller, post)
                .await
                .map(MutationOutput::Created),
            Mutation::AddComment { post_id, text } => backend
                .add_comment(caller, *post_id, text)
                .await
                .map(|_| MutationOutput::Done),
            Mutation::LikePost(post_id) => backend
                .like_post(caller, *post_id)
                .await
                .map(|_| MutationOutput::Done),
            Mutation::UnlikePost(post_id) => backend
                .unlike_post(caller, *post_id)
                .await
                .map(|_| MutationOutput::Done),
            Mutation::AddRating { post_id, rating } => backend
                .add_investment_rating(caller, *post_id, *rating)
                .await
                .map(|_| MutationOutput::Done),
            Mutation::SaveProfile(profile) => backend
                .save_caller_user_profile(caller, profile)
                .await
                .map(|_| MutationOutput::Done),
        }
    }
}

impl QueryCache {
    /// Forward `mutation` to the backend on behalf of `caller`.
    ///
    /// Affected keys are invalidated only when the backend accepts the write.
    pub async fn mutate(
        &self,
        caller: &Principal,
        mutation: &Mutation,
    ) -> BackendResult<MutationOutput> {
        let backend = self.actor().get().ok_or(BackendError::Unavailable)?;
        let method = mutation.method();

        match mutation.execute(backend.as_ref(), caller).await {
            Ok(output) => {
                self.invalidate(&mutation.invalidations(caller));
                tracing::info!(method, caller = %caller, "Mutation succeeded");
                Ok(output)
            }
            Err(error) => {
                tracing::error!(method, caller = %caller, error = %error, "Mutation failed");
                Err(error)
            }
        }
    }
}
