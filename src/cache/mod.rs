//! Keyed query cache between the page controllers and the backend client.
//!
//! Reads are memoized per [`QueryKey`]. A fresh entry is served directly, an
//! aged entry is served and revalidated in the background, and an invalidated
//! or missing entry is fetched before the read returns. At most one fetch per
//! key is in flight; overlapping readers await the same shared future.
//!
//! The store is bounded: past the configured entry budget the least useful
//! keys are evicted, and keys nobody reads expire after an idle period.
//!
//! Writes go through [`QueryCache::mutate`], which invalidates every key the
//! mutation could have changed once the backend accepts it.

pub mod keys;
pub mod mutation;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use moka::sync::Cache;

use crate::backend::{
    ActorHandle, Backend, BackendError, Comment, Post, PostId, Principal, UserProfile, UserRole,
};

pub use keys::{Invalidation, PostScope, QueryKey, QueryKind};
pub use mutation::{Mutation, MutationOutput};

/// A cached backend response.
#[derive(Debug, Clone)]
pub enum QueryData {
    Posts(Vec<Post>),
    Post(Option<Post>),
    Comments(Vec<Comment>),
    Profile(Option<UserProfile>),
    Role(UserRole),
}

/// Typed view over [`QueryData`].
pub trait FromQueryData: Sized {
    fn from_query_data(data: QueryData) -> Option<Self>;
}

impl FromQueryData for Vec<Post> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Posts(posts) => Some(posts),
            _ => None,
        }
    }
}

impl FromQueryData for Option<Post> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Post(post) => Some(post),
            _ => None,
        }
    }
}

impl FromQueryData for Vec<Comment> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Comments(comments) => Some(comments),
            _ => None,
        }
    }
}

impl FromQueryData for Option<UserProfile> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Profile(profile) => Some(profile),
            _ => None,
        }
    }
}

impl FromQueryData for UserRole {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Role(role) => Some(role),
            _ => None,
        }
    }
}

/// Result of a read: whatever data is available, plus loading/error flags.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<BackendError>,
}

impl<T> QueryState<T> {
    /// Nothing to show yet; the backend is not initialized.
    pub fn pending() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }
}

type FetchResult = Result<QueryData, BackendError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Entry budget when none is configured.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;
/// Entries unread for this long are dropped.
pub const DEFAULT_TIME_TO_IDLE: Duration = Duration::from_secs(600);

#[derive(Clone)]
struct Entry {
    data: QueryData,
    fetched_at: Instant,
    invalidated: bool,
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

struct Store {
    // Bounded; least-used keys are evicted, idle keys expire.
    entries: Cache<QueryKey, Entry>,
    // Only holds fetches that have not settled yet.
    in_flight: Mutex<HashMap<QueryKey, InFlight>>,
    next_fetch: AtomicU64,
}

enum Lookup {
    Fresh(QueryData),
    Stale(QueryData),
    Missing(Option<QueryData>),
}

impl Store {
    fn lookup(&self, key: &QueryKey, stale_after: Duration) -> Lookup {
        match self.entries.get(key) {
            None => Lookup::Missing(None),
            Some(entry) if entry.invalidated => Lookup::Missing(Some(entry.data)),
            Some(entry) if entry.fetched_at.elapsed() >= stale_after => {
                Lookup::Stale(entry.data)
            }
            Some(entry) => Lookup::Fresh(entry.data),
        }
    }

    /// A fetch lands fresh only if no invalidation detached it meanwhile.
    fn complete(&self, key: &QueryKey, id: u64, result: &FetchResult) {
        let mut in_flight = lock(&self.in_flight);
        let current = in_flight.get(key).is_some_and(|f| f.id == id);
        if current {
            in_flight.remove(key);
        }

        let Ok(data) = result else {
            return;
        };

        if current || !self.entries.contains_key(key) {
            self.entries.insert(
                key.clone(),
                Entry {
                    data: data.clone(),
                    fetched_at: Instant::now(),
                    invalidated: !current,
                },
            );
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub struct QueryCache {
    actor: ActorHandle,
    stale_after: Duration,
    store: Arc<Store>,
}

impl QueryCache {
    pub fn new(actor: ActorHandle, stale_after: Duration) -> Self {
        Self::bounded(actor, stale_after, DEFAULT_MAX_ENTRIES, DEFAULT_TIME_TO_IDLE)
    }

    pub fn bounded(
        actor: ActorHandle,
        stale_after: Duration,
        max_entries: u64,
        time_to_idle: Duration,
    ) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(time_to_idle)
            .build();
        Self {
            actor,
            stale_after,
            store: Arc::new(Store {
                entries,
                in_flight: Mutex::new(HashMap::new()),
                next_fetch: AtomicU64::new(0),
            }),
        }
    }

    pub fn actor(&self) -> &ActorHandle {
        &self.actor
    }

    pub async fn read<T: FromQueryData>(&self, key: QueryKey) -> QueryState<T> {
        let Some(backend) = self.actor.get() else {
            return QueryState::pending();
        };

        match self.store.lookup(&key, self.stale_after) {
            Lookup::Fresh(data) => typed(&key, data),
            Lookup::Stale(data) => {
                // The spawned driver finishes the refresh.
                let _ = self.join_or_start(backend, key.clone());
                typed(&key, data)
            }
            Lookup::Missing(previous) => {
                let fetch = self.join_or_start(backend, key.clone());
                match fetch.await {
                    Ok(data) => typed(&key, data),
                    Err(error) => {
                        tracing::warn!(key = %key, error = %error, "Query failed");
                        QueryState {
                            data: previous.and_then(T::from_query_data),
                            is_loading: false,
                            error: Some(error),
                        }
                    }
                }
            }
        }
    }

    pub async fn posts(&self, scope: PostScope) -> QueryState<Vec<Post>> {
        self.read(QueryKey::Posts(scope)).await
    }

    pub async fn post(&self, post_id: PostId) -> QueryState<Option<Post>> {
        self.read(QueryKey::Post(post_id)).await
    }

    pub async fn comments(&self, post_id: PostId) -> QueryState<Vec<Comment>> {
        self.read(QueryKey::Comments(post_id)).await
    }

    pub async fn user_profile(&self, user: &Principal) -> QueryState<Option<UserProfile>> {
        self.read(QueryKey::UserProfile(user.clone())).await
    }

    pub async fn caller_profile(&self, caller: &Principal) -> QueryState<Option<UserProfile>> {
        self.read(QueryKey::CallerProfile(caller.clone())).await
    }

    pub async fn caller_role(&self, caller: &Principal) -> QueryState<UserRole> {
        self.read(QueryKey::CallerRole(caller.clone())).await
    }

    /// Mark every matching key stale and detach its in-flight fetch.
    pub fn invalidate(&self, targets: &[Invalidation]) {
        let matches = |key: &QueryKey| targets.iter().any(|t| t.matches(key));
        let mut in_flight = lock(&self.store.in_flight);

        let mut keys: HashSet<QueryKey> =
            in_flight.keys().filter(|key| matches(*key)).cloned().collect();
        keys.extend(
            self.store
                .entries
                .iter()
                .filter(|(key, _)| matches(key.as_ref()))
                .map(|(key, _)| QueryKey::clone(&key)),
        );

        for key in keys {
            if let Some(mut entry) = self.store.entries.get(&key) {
                entry.invalidated = true;
                self.store.entries.insert(key.clone(), entry);
            }
            in_flight.remove(&key);
            tracing::debug!(key = %key, "Invalidated query");
        }
    }

    /// Whether `key` holds data that has not been invalidated.
    pub fn is_valid(&self, key: &QueryKey) -> bool {
        self.store
            .entries
            .get(key)
            .is_some_and(|entry| !entry.invalidated)
    }

    /// Number of resident entries once pending evictions have run.
    pub fn entry_count(&self) -> u64 {
        self.store.entries.run_pending_tasks();
        self.store.entries.entry_count()
    }

    fn join_or_start(&self, backend: Arc<dyn Backend>, key: QueryKey) -> SharedFetch {
        let mut in_flight = lock(&self.store.in_flight);
        if let Some(existing) = in_flight.get(&key) {
            return existing.fetch.clone();
        }

        let id = self.store.next_fetch.fetch_add(1, Ordering::Relaxed);
        let store = Arc::clone(&self.store);
        let fetch_key = key.clone();
        let fetch = async move {
            let result = fetch_query(backend.as_ref(), &fetch_key).await;
            store.complete(&fetch_key, id, &result);
            tracing::debug!(key = %fetch_key, ok = result.is_ok(), "Query settled");
            result
        }
        .boxed()
        .shared();

        // Driven to completion even if every reader goes away.
        tokio::spawn(fetch.clone().map(drop));
        in_flight.insert(
            key,
            InFlight {
                id,
                fetch: fetch.clone(),
            },
        );
        fetch
    }

    #[cfg(test)]
    fn in_flight(&self, key: &QueryKey) -> Option<SharedFetch> {
        lock(&self.store.in_flight)
            .get(key)
            .map(|f| f.fetch.clone())
    }
}

fn typed<T: FromQueryData>(key: &QueryKey, data: QueryData) -> QueryState<T> {
    match T::from_query_data(data) {
        Some(value) => QueryState::ready(value),
        None => QueryState {
            data: None,
            is_loading: false,
            error: Some(BackendError::Decode {
                method: key.to_string(),
                message: "cached value has the wrong shape".to_string(),
            }),
        },
    }
}

async fn fetch_query(backend: &dyn Backend, key: &QueryKey) -> FetchResult {
    match key {
        QueryKey::Posts(PostScope::All) => backend.get_all_posts(None).await.map(QueryData::Posts),
        QueryKey::Posts(PostScope::Category(category)) => backend
            .get_posts_by_category(None, *category)
            .await
            .map(QueryData::Posts),
        QueryKey::Post(id) => backend.get_post(None, *id).await.map(QueryData::Post),
        QueryKey::Comments(id) => backend
            .get_comments(None, *id)
            .await
            .map(QueryData::Comments),
        QueryKey::UserProfile(user) => backend
            .get_user_profile(None, user)
            .await
            .map(QueryData::Profile),
        QueryKey::CallerProfile(caller) => backend
            .get_caller_user_profile(Some(caller))
            .await
            .map(QueryData::Profile),
        QueryKey::CallerRole(caller) => backend
            .get_caller_user_role(Some(caller))
            .await
            .map(QueryData::Role),
    }
}
