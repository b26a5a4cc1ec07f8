use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::backend::Principal;

struct Session {
    principal: Principal,
    expires_at: Instant,
}

/// In-memory map from session cookie token to the signed-in principal.
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Start a session for `principal`. Returns the cookie token.
    pub fn create(&mut self, principal: Principal) -> String {
        self.clear_stale();

        let token = generate_token();
        self.sessions.insert(
            token.clone(),
            Session {
                principal,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    pub fn get(&self, token: &str) -> Option<Principal> {
        self.sessions
            .get(token)
            .filter(|session| Instant::now() < session.expires_at)
            .map(|session| session.principal.clone())
    }

    pub fn remove(&mut self, token: &str) -> Option<Principal> {
        self.sessions.remove(token).map(|session| session.principal)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove expired sessions
    fn clear_stale(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, session| now < session.expires_at);
    }
}

/// Build the Set-Cookie header value for a new session.
pub fn session_cookie(name: &str, token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name,
        token,
        ttl.as_secs()
    )
}

/// Build a Set-Cookie header value that clears the session.
pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
