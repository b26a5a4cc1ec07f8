use std::fmt;

use crate::backend::{Category, PostId, Principal};

/// Which slice of the post list a read covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostScope {
    All,
    Category(Category),
}

/// Identity of one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Posts(PostScope),
    Post(PostId),
    Comments(PostId),
    UserProfile(Principal),
    CallerProfile(Principal),
    CallerRole(Principal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Posts,
    Post,
    Comments,
    UserProfile,
    CallerProfile,
    CallerRole,
}

impl QueryKey {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryKey::Posts(_) => QueryKind::Posts,
            QueryKey::Post(_) => QueryKind::Post,
            QueryKey::Comments(_) => QueryKind::Comments,
            QueryKey::UserProfile(_) => QueryKind::UserProfile,
            QueryKey::CallerProfile(_) => QueryKind::CallerProfile,
            QueryKey::CallerRole(_) => QueryKind::CallerRole,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Posts(PostScope::All) => write!(f, "posts/all"),
            QueryKey::Posts(PostScope::Category(c)) => write!(f, "posts/category/{}", c.slug()),
            QueryKey::Post(id) => write!(f, "post/{}", id),
            QueryKey::Comments(id) => write!(f, "comments/{}", id),
            QueryKey::UserProfile(p) => write!(f, "userProfile/{}", p),
            QueryKey::CallerProfile(p) => write!(f, "currentUserProfile/{}", p),
            QueryKey::CallerRole(p) => write!(f, "currentUserRole/{}", p),
        }
    }
}

/// A set member passed to [`super::QueryCache::invalidate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Exactly this key.
    Key(QueryKey),
    /// Every key of this kind.
    Kind(QueryKind),
}

impl Invalidation {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Invalidation::Key(target) => target == key,
            Invalidation::Kind(kind) => key.kind() == *kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms_are_stable() {
        assert_eq!(QueryKey::Posts(PostScope::All).to_string(), "posts/all");
        assert_eq!(
            QueryKey::Posts(PostScope::Category(Category::DisasterRelated)).to_string(),
            "posts/category/disasterRelated"
        );
        assert_eq!(QueryKey::Comments(9).to_string(), "comments/9");
    }

    #[test]
    fn kind_invalidation_covers_every_scope() {
        let all_posts = Invalidation::Kind(QueryKind::Posts);
        assert!(all_posts.matches(&QueryKey::Posts(PostScope::All)));
        for category in Category::ALL {
            assert!(all_posts.matches(&QueryKey::Posts(PostScope::Category(category))));
        }
        assert!(!all_posts.matches(&QueryKey::Post(1)));
    }

    #[test]
    fn key_invalidation_is_exact() {
        let comments = Invalidation::Key(QueryKey::Comments(1));
        assert!(comments.matches(&QueryKey::Comments(1)));
        assert!(!comments.matches(&QueryKey::Comments(2)));
        assert!(!comments.matches(&QueryKey::Post(1)));
    }
}
