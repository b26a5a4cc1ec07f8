use crate::backend::Category;
use crate::cache::PostScope;

/// Feed category selection, carried in the `?category=` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
}

pub struct FilterOption {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

impl Filter {
    /// Unknown or empty values fall back to showing everything.
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(Category::from_slug)
            .map(Filter::Category)
            .unwrap_or(Filter::All)
    }

    pub fn scope(self) -> PostScope {
        match self {
            Filter::All => PostScope::All,
            Filter::Category(category) => PostScope::Category(category),
        }
    }

    fn href(self) -> String {
        match self {
            Filter::All => "/".to_string(),
            Filter::Category(category) => format!("/?category={}", category.slug()),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Filter::All => "All Ideas",
            Filter::Category(category) => category.label(),
        }
    }
}

/// The four filter chips, with exactly one marked active.
pub fn filter_options(selected: Filter) -> Vec<FilterOption> {
    std::iter::once(Filter::All)
        .chain(Category::ALL.into_iter().map(Filter::Category))
        .map(|filter| FilterOption {
            label: filter.label(),
            href: filter.href(),
            active: filter == selected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parsing() {
        assert_eq!(Filter::from_query(None), Filter::All);
        assert_eq!(Filter::from_query(Some("all")), Filter::All);
        assert_eq!(Filter::from_query(Some("bogus")), Filter::All);
        assert_eq!(
            Filter::from_query(Some("disasterRelated")),
            Filter::Category(Category::DisasterRelated)
        );
    }

    #[test]
    fn exactly_one_option_active() {
        let options = filter_options(Filter::Category(Category::Environmental));
        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| o.active).count(), 1);
        assert_eq!(options[0].label, "All Ideas");
        assert!(options[1].active);
        assert_eq!(options[1].href, "/?category=environmental");
    }
}
