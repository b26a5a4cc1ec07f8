use serde::Deserialize;

use crate::backend::{Category, NewPost, UserProfile, VirtualPrototype};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequiredFields,

    #[error("Please enter a comment")]
    EmptyComment,

    #[error("Please enter your name and email")]
    IncompleteProfile,
}

/// Raw fields of the create-post form, kept verbatim for re-rendering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub prototype_description: String,
    pub image_url: String,
}

pub struct CategoryOption {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl CreatePostForm {
    /// Title, description, and category are required after trimming. A
    /// prototype is attached only when one of its fields is non-blank.
    pub fn validate(&self) -> Result<NewPost, ValidationError> {
        let title = self.title.trim();
        let description = self.description.trim();
        let category = Category::from_slug(self.category.trim());

        let Some(category) = category.filter(|_| !title.is_empty() && !description.is_empty())
        else {
            return Err(ValidationError::MissingRequiredFields);
        };

        let prototype_description = self.prototype_description.trim();
        let image_url = self.image_url.trim();
        let virtual_prototype = (!prototype_description.is_empty() || !image_url.is_empty())
            .then(|| VirtualPrototype {
                description: prototype_description.to_string(),
                image_url: image_url.to_string(),
            });

        Ok(NewPost {
            title: title.to_string(),
            description: description.to_string(),
            category,
            virtual_prototype,
        })
    }

    pub fn category_options(&self) -> Vec<CategoryOption> {
        Category::ALL
            .into_iter()
            .map(|category| CategoryOption {
                slug: category.slug(),
                label: category.label(),
                selected: category.slug() == self.category,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<UserProfile, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(ValidationError::IncompleteProfile);
        }
        Ok(UserProfile {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

impl From<UserProfile> for ProfileForm {
    fn from(profile: UserProfile) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
        }
    }
}
