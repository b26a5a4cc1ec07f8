use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    Backend, BackendError, BackendResult, Category, Comment, InvestmentRating, NewPost, Post,
    PostId, Principal, UserProfile, UserRole,
};

/// In-process stand-in for the backend actor.
///
/// Used for local development (`backend.mode = "memory"`) and tests. Every
/// call is counted so callers can assert that a code path never reached the
/// backend.
/// Most recent method names kept by [`MemoryBackend::call_log`].
pub const CALL_LOG_CAPACITY: usize = 256;

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

#[derive(Default)]
struct MemoryState {
    next_id: PostId,
    posts: BTreeMap<PostId, Post>,
    comments: HashMap<PostId, Vec<Comment>>,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
    call_log: VecDeque<&'static str>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The last [`CALL_LOG_CAPACITY`] method names, oldest first.
    pub fn call_log(&self) -> Vec<&'static str> {
        self.lock().call_log.iter().copied().collect()
    }

    /// When set, every subsequent call fails with a rejection.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Insert a post directly, bypassing the call counter.
    pub fn seed_post(&self, author: &Principal, post: NewPost) -> PostId {
        let mut state = self.lock();
        state.insert_post(author.clone(), post)
    }

    pub fn seed_profile(&self, user: &Principal, profile: UserProfile) {
        self.lock().profiles.insert(user.clone(), profile);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, method: &'static str) -> BackendResult<MutexGuard<'_, MemoryState>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if state.call_log.len() == CALL_LOG_CAPACITY {
            state.call_log.pop_front();
        }
        state.call_log.push_back(method);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected {
                method: method.to_string(),
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(state)
    }
}

impl MemoryState {
    fn insert_post(&mut self, author: Principal, post: NewPost) -> PostId {
        let id = self.next_id;
        self.next_id += 1;
        self.posts.insert(
            id,
            Post {
                id,
                title: post.title,
                description: post.description,
                category: post.category,
                author,
                timestamp: now_nanos(),
                like_count: 0,
                diamond_count: 0,
                blue_sapphire_count: 0,
                red_ruby_count: 0,
                virtual_prototype: post.virtual_prototype,
            },
        );
        id
    }

    fn post_mut(&mut self, method: &str, post_id: PostId) -> BackendResult<&mut Post> {
        self.posts
            .get_mut(&post_id)
            .ok_or_else(|| BackendError::Rejected {
                method: method.to_string(),
                status: 404,
                message: format!("Post {} not found", post_id),
            })
    }
}

fn now_nanos() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}

fn anonymous(method: &str) -> BackendError {
    BackendError::Rejected {
        method: method.to_string(),
        status: 401,
        message: "Anonymous caller".to_string(),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn add_comment(
        &self,
        caller: Option<&Principal>,
        post_id: PostId,
        text: &str,
    ) -> BackendResult<()> {
        let mut state = self.enter("addComment")?;
        let author = caller.ok_or_else(|| anonymous("addComment"))?.clone();
        state.post_mut("addComment", post_id)?;
        state.comments.entry(post_id).or_default().push(Comment {
            text: text.to_string(),
            author,
            timestamp: now_nanos(),
        });
        Ok(())
    }

    async fn add_investment_rating(
        &self,
        _caller: Option<&Principal>,
        post_id: PostId,
        rating: InvestmentRating,
    ) -> BackendResult<()> {
        let mut state = self.enter("addInvestmentRating")?;
        let post = state.post_mut("addInvestmentRating", post_id)?;
        match rating {
            InvestmentRating::Diamond => post.diamond_count += 1,
            InvestmentRating::BlueSapphire => post.blue_sapphire_count += 1,
            InvestmentRating::RedRuby => post.red_ruby_count += 1,
        }
        Ok(())
    }

    async fn create_post(
        &self,
        caller: Option<&Principal>,
        post: &NewPost,
    ) -> BackendResult<PostId> {
        let mut state = self.enter("createPost")?;
        let author = caller.ok_or_else(|| anonymous("createPost"))?.clone();
        Ok(state.insert_post(author, post.clone()))
    }

    async fn get_all_posts(&self, _caller: Option<&Principal>) -> BackendResult<Vec<Post>> {
        let state = self.enter("getAllPosts")?;
        Ok(state.posts.values().cloned().collect())
    }

    async fn get_posts_by_category(
        &self,
        _caller: Option<&Principal>,
        category: Category,
    ) -> BackendResult<Vec<Post>> {
        let state = self.enter("getPostsByCategory")?;
        Ok(state
            .posts
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn get_post(
        &self,
        _caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<Option<Post>> {
        let state = self.enter("getPost")?;
        Ok(state.posts.get(&post_id).cloned())
    }

    async fn get_comments(
        &self,
        _caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<Vec<Comment>> {
        let state = self.enter("getComments")?;
        Ok(state.comments.get(&post_id).cloned().unwrap_or_default())
    }

    async fn like_post(&self, _caller: Option<&Principal>, post_id: PostId) -> BackendResult<()> {
        let mut state = self.enter("likePost")?;
        state.post_mut("likePost", post_id)?.like_count += 1;
        Ok(())
    }

    async fn unlike_post(
        &self,
        _caller: Option<&Principal>,
        post_id: PostId,
    ) -> BackendResult<()> {
        let mut state = self.enter("unlikePost")?;
        let post = state.post_mut("unlikePost", post_id)?;
        post.like_count = post.like_count.saturating_sub(1);
        Ok(())
    }

    async fn get_caller_user_profile(
        &self,
        caller: Option<&Principal>,
    ) -> BackendResult<Option<UserProfile>> {
        let state = self.enter("getCallerUserProfile")?;
        Ok(caller.and_then(|c| state.profiles.get(c).cloned()))
    }

    async fn save_caller_user_profile(
        &self,
        caller: Option<&Principal>,
        profile: &UserProfile,
    ) -> BackendResult<()> {
        let mut state = self.enter("saveCallerUserProfile")?;
        let caller = caller.ok_or_else(|| anonymous("saveCallerUserProfile"))?;
        state.profiles.insert(caller.clone(), profile.clone());
        Ok(())
    }

    async fn get_user_profile(
        &self,
        _caller: Option<&Principal>,
        user: &Principal,
    ) -> BackendResult<Option<UserProfile>> {
        let state = self.enter("getUserProfile")?;
        Ok(state.profiles.get(user).cloned())
    }

    async fn get_caller_user_role(&self, caller: Option<&Principal>) -> BackendResult<UserRole> {
        let state = self.enter("getCallerUserRole")?;
        Ok(match caller {
            Some(caller) => state.roles.get(caller).copied().unwrap_or(UserRole::User),
            None => UserRole::Guest,
        })
    }

    async fn is_caller_admin(&self, caller: Option<&Principal>) -> BackendResult<bool> {
        let state = self.enter("isCallerAdmin")?;
        Ok(caller
            .and_then(|c| state.roles.get(c))
            .is_some_and(|role| *role == UserRole::Admin))
    }

    async fn assign_caller_user_role(
        &self,
        _caller: Option<&Principal>,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()> {
        let mut state = self.enter("assignCallerUserRole")?;
        state.roles.insert(user.clone(), role);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea(title: &str, category: Category) -> NewPost {
        NewPost {
            title: title.to_string(),
            description: format!("{} description", title),
            category,
            virtual_prototype: None,
        }
    }

    #[tokio::test]
    async fn category_read_only_returns_matching_posts() {
        let backend = MemoryBackend::new();
        let author = Principal::new("author-1");
        backend.seed_post(&author, idea("Reef", Category::Environmental));
        backend.seed_post(&author, idea("Levee", Category::DisasterRelated));
        backend.seed_post(&author, idea("Tram", Category::SustainableInfrastructure));
        backend.seed_post(&author, idea("Compost", Category::Environmental));

        for category in Category::ALL {
            let posts = backend.get_posts_by_category(None, category).await.unwrap();
            assert!(!posts.is_empty());
            assert!(posts.iter().all(|p| p.category == category));
        }
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let backend = MemoryBackend::new();
        let caller = Principal::new("author-1");
        let first = backend
            .create_post(Some(&caller), &idea("A", Category::Environmental))
            .await
            .unwrap();
        let second = backend
            .create_post(Some(&caller), &idea("B", Category::Environmental))
            .await
            .unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn unlike_never_goes_negative() {
        let backend = MemoryBackend::new();
        let id = backend.seed_post(&Principal::new("a"), idea("A", Category::Environmental));
        backend.unlike_post(None, id).await.unwrap();
        let post = backend.get_post(None, id).await.unwrap().unwrap();
        assert_eq!(post.like_count, 0);
    }

    #[tokio::test]
    async fn comments_keep_insertion_order() {
        let backend = MemoryBackend::new();
        let caller = Principal::new("commenter");
        let id = backend.seed_post(&caller, idea("A", Category::Environmental));
        for text in ["first", "second", "third"] {
            backend.add_comment(Some(&caller), id, text).await.unwrap();
        }
        let texts: Vec<_> = backend
            .get_comments(None, id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn roles_default_by_caller_presence() {
        let backend = MemoryBackend::new();
        let user = Principal::new("user-1");
        assert_eq!(backend.get_caller_user_role(None).await.unwrap(), UserRole::Guest);
        assert_eq!(
            backend.get_caller_user_role(Some(&user)).await.unwrap(),
            UserRole::User
        );
        assert!(!backend.is_caller_admin(Some(&user)).await.unwrap());

        backend
            .assign_caller_user_role(Some(&user), &user, UserRole::Admin)
            .await
            .unwrap();
        assert!(backend.is_caller_admin(Some(&user)).await.unwrap());
    }

    #[tokio::test]
    async fn counts_calls_and_fails_on_demand() {
        let backend = MemoryBackend::new();
        backend.get_all_posts(None).await.unwrap();
        backend.set_failing(true);
        assert!(backend.get_all_posts(None).await.is_err());
        assert_eq!(backend.calls(), 2);
        assert_eq!(backend.call_log(), vec!["getAllPosts", "getAllPosts"]);
    }

    #[tokio::test]
    async fn call_log_keeps_only_recent_calls() {
        let backend = MemoryBackend::new();
        for _ in 0..CALL_LOG_CAPACITY {
            backend.get_all_posts(None).await.unwrap();
        }
        backend.is_caller_admin(None).await.unwrap();

        let log = backend.call_log();
        assert_eq!(log.len(), CALL_LOG_CAPACITY);
        assert_eq!(log.last(), Some(&"isCallerAdmin"));
        assert_eq!(backend.calls(), CALL_LOG_CAPACITY + 1);
    }
}
