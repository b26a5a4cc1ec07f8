use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::{DevIdentityProvider, IdentityProvider, SessionStore};
use crate::backend::ActorHandle;
use crate::cache::QueryCache;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: QueryCache,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(config: Config, actor: ActorHandle) -> Self {
        let cache = QueryCache::bounded(
            actor,
            config.cache.stale_after(),
            config.cache.max_entries,
            config.cache.time_to_idle(),
        );
        let sessions = SessionStore::new(config.auth.session_ttl());
        Self {
            config,
            cache,
            sessions: Arc::new(Mutex::new(sessions)),
            identity: Arc::new(DevIdentityProvider),
        }
    }
}
