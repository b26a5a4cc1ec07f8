use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric post identifier assigned by the backend.
pub type PostId = u64;

/// Opaque identity of an authenticated user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Environmental,
    DisasterRelated,
    SustainableInfrastructure,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::DisasterRelated,
        Category::SustainableInfrastructure,
    ];

    /// Wire name, also used in query strings and form values.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Environmental => "environmental",
            Category::DisasterRelated => "disasterRelated",
            Category::SustainableInfrastructure => "sustainableInfrastructure",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Environmental => "Environmental",
            Category::DisasterRelated => "Disaster Relief",
            Category::SustainableInfrastructure => "Sustainable Infrastructure",
        }
    }

    /// CSS modifier for the category badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            Category::Environmental => "badge-green",
            Category::DisasterRelated => "badge-pink",
            Category::SustainableInfrastructure => "badge-blue",
        }
    }
}

/// The three investment-interest tiers a post can be rated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvestmentRating {
    Diamond,
    BlueSapphire,
    RedRuby,
}

impl InvestmentRating {
    pub const ALL: [InvestmentRating; 3] = [
        InvestmentRating::Diamond,
        InvestmentRating::BlueSapphire,
        InvestmentRating::RedRuby,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            InvestmentRating::Diamond => "diamond",
            InvestmentRating::BlueSapphire => "blueSapphire",
            InvestmentRating::RedRuby => "redRuby",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.slug() == slug)
    }

    pub fn label(self) -> &'static str {
        match self {
            InvestmentRating::Diamond => "Diamond",
            InvestmentRating::BlueSapphire => "Blue Sapphire",
            InvestmentRating::RedRuby => "Red Ruby",
        }
    }

    pub fn price_range(self) -> &'static str {
        match self {
            InvestmentRating::Diamond => "$100-300",
            InvestmentRating::BlueSapphire => "$300-500",
            InvestmentRating::RedRuby => "$500-700",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            InvestmentRating::Diamond => "/assets/img/diamond.svg",
            InvestmentRating::BlueSapphire => "/assets/img/blue-sapphire.svg",
            InvestmentRating::RedRuby => "/assets/img/red-ruby.svg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    pub fn label(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::User => "Member",
            UserRole::Guest => "Guest",
        }
    }
}

/// Optional rich attachment on a post. Either field may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualPrototype {
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub author: Principal,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    pub like_count: u64,
    pub diamond_count: u64,
    pub blue_sapphire_count: u64,
    pub red_ruby_count: u64,
    #[serde(default)]
    pub virtual_prototype: Option<VirtualPrototype>,
}

impl Post {
    pub fn rating_count(&self, rating: InvestmentRating) -> u64 {
        match rating {
            InvestmentRating::Diamond => self.diamond_count,
            InvestmentRating::BlueSapphire => self.blue_sapphire_count,
            InvestmentRating::RedRuby => self.red_ruby_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author: Principal,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

/// Payload for `createPost`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub virtual_prototype: Option<VirtualPrototype>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_slugs_match_wire_names() {
        for category in Category::ALL {
            let wire = serde_json::to_string(&category).unwrap();
            assert_eq!(wire, format!("\"{}\"", category.slug()));
            assert_eq!(Category::from_slug(category.slug()), Some(category));
        }
        assert_eq!(Category::from_slug("sports"), None);
    }

    #[test]
    fn rating_slugs_match_wire_names() {
        for rating in InvestmentRating::ALL {
            let wire = serde_json::to_string(&rating).unwrap();
            assert_eq!(wire, format!("\"{}\"", rating.slug()));
        }
    }

    #[test]
    fn post_decodes_without_prototype() {
        let json = r#"{
            "id": 7,
            "title": "Solar benches",
            "description": "Benches that charge phones",
            "category": "sustainableInfrastructure",
            "author": "aaaaa-aa",
            "timestamp": 1700000000000000000,
            "likeCount": 3,
            "diamondCount": 1,
            "blueSapphireCount": 0,
            "redRubyCount": 2
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.category, Category::SustainableInfrastructure);
        assert!(post.virtual_prototype.is_none());
        assert_eq!(post.rating_count(InvestmentRating::RedRuby), 2);
        assert_eq!(post.rating_count(InvestmentRating::BlueSapphire), 0);
    }

    #[test]
    fn prototype_uses_camel_case_image_url() {
        let prototype = VirtualPrototype {
            description: "Scale model".into(),
            image_url: String::new(),
        };
        let json = serde_json::to_value(&prototype).unwrap();
        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["description"], "Scale model");
    }
}
