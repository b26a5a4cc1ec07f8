use super::notice::Notice;
use crate::backend::Principal;
use crate::cache::QueryCache;

/// Everything the page layout needs: who is signed in, whether to prompt for
/// a profile, and a pending toast.
pub struct Shell {
    pub principal: Option<Principal>,
    pub needs_profile: bool,
    pub notice: Option<Notice>,
}

impl Shell {
    pub async fn load(
        cache: &QueryCache,
        principal: Option<&Principal>,
        notice: Option<Notice>,
    ) -> Self {
        // Only a successful read of "no profile yet" prompts; errors stay quiet.
        let needs_profile = match principal {
            Some(principal) => matches!(cache.caller_profile(principal).await.data, Some(None)),
            None => false,
        };
        Self {
            principal: principal.cloned(),
            needs_profile,
            notice,
        }
    }

    /// Shell built without any backend reads; used when re-rendering a
    /// rejected form.
    pub fn offline(principal: Option<Principal>, notice: Option<Notice>) -> Self {
        Self {
            principal,
            needs_profile: false,
            notice,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Leading group of the principal text, for the header badge.
    pub fn short_principal(&self) -> &str {
        self.principal
            .as_ref()
            .map(|p| p.as_str().split('-').next().unwrap_or_default())
            .unwrap_or_default()
    }
}
