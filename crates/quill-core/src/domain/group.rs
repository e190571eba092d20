use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidationErrors;

/// Group entity - a community posts can be filed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    pub fn new(title: String, slug: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description,
        }
    }

    pub fn to_ref(&self) -> GroupRef {
        GroupRef {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// The part of a group shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// Administrator input for a new group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDraft {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl GroupDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.push("title", "title must not be empty");
        } else if self.title.chars().count() > 200 {
            errors.push("title", "title must be at most 200 characters");
        }
        if !is_slug(&self.slug) {
            errors.push(
                "slug",
                "slug may only contain letters, numbers, underscores or hyphens",
            );
        }
        errors.into_result()
    }

    pub fn into_group(self) -> Group {
        Group::new(self.title, self.slug, self.description)
    }
}

fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, slug: &str) -> GroupDraft {
        GroupDraft {
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_valid_group_draft() {
        assert!(draft("Rustaceans", "rust-lang_1").validate().is_ok());
    }

    #[test]
    fn test_bad_slug_and_title() {
        let errors = draft("  ", "no spaces").validate().unwrap_err();
        assert_eq!(errors.violations().len(), 2);
        assert_eq!(errors.messages_for("title").len(), 1);
        assert_eq!(errors.messages_for("slug").len(), 1);
    }
}
