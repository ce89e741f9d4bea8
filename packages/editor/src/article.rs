//! # Article Records
//!
//! The stored unit of the publication. An article carries its body as an
//! opaque serialized [`Document`](crate::Document) alongside editorial
//! metadata (taxonomy, status and the breaking-news / editor's-pick flags).

use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

const MAX_SLUG_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArticleError {
    #[error("Article title cannot be empty")]
    EmptyTitle,

    #[error("Cannot {action} an article that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: ArticleStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub breaking: bool,
    #[serde(default)]
    pub editors_pick: bool,
    /// Serialized document body
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// New empty draft
    pub fn new(title: &str, category: &str) -> Result<Self, ArticleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ArticleError::EmptyTitle);
        }

        let now = Utc::now();
        let slug = slugify(title);

        Ok(Self {
            id: article_id(&slug, now),
            title: title.to_string(),
            slug,
            category: slugify(category),
            subcategory: None,
            excerpt: None,
            featured_image: None,
            status: ArticleStatus::Draft,
            breaking: false,
            editors_pick: false,
            content: String::new(),
            created_at: now,
            updated_at: now,
            published_at: None,
        })
    }

    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    /// Make the article public. `published_at` is kept from the first
    /// publication.
    pub fn publish(&mut self) -> Result<(), ArticleError> {
        if self.status == ArticleStatus::Published {
            return Err(ArticleError::InvalidTransition {
                action: "publish",
                status: self.status,
            });
        }

        let now = Utc::now();
        self.status = ArticleStatus::Published;
        self.published_at.get_or_insert(now);
        self.updated_at = now;
        Ok(())
    }

    /// Return a published article to draft
    pub fn unpublish(&mut self) -> Result<(), ArticleError> {
        if self.status != ArticleStatus::Published {
            return Err(ArticleError::InvalidTransition {
                action: "unpublish",
                status: self.status,
            });
        }

        self.status = ArticleStatus::Draft;
        self.breaking = false;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn archive(&mut self) -> Result<(), ArticleError> {
        if self.status == ArticleStatus::Archived {
            return Err(ArticleError::InvalidTransition {
                action: "archive",
                status: self.status,
            });
        }

        self.status = ArticleStatus::Archived;
        self.breaking = false;
        self.editors_pick = false;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Retitle; the slug follows the title until the article is first published
    pub fn set_title(&mut self, title: &str) -> Result<(), ArticleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ArticleError::EmptyTitle);
        }

        self.title = title.to_string();
        if self.published_at.is_none() {
            self.slug = slugify(title);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// URL slug: lowercase ASCII alphanumerics joined by single dashes
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// First of `slug`, `slug-2`, `slug-3`, ... not already taken
pub fn unique_slug(slug: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(slug) {
        return slug.to_string();
    }

    (2..)
        .map(|n| format!("{}-{}", slug, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| slug.to_string())
}

fn article_id(slug: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Hasher::new();
    hasher.update(slug.as_bytes());
    hasher.update(&at.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    format!("{:08x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Summer   Trends 2024 "), "summer-trends-2024");
        assert_eq!(slugify("Editor's Pick"), "editors-pick");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "untitled");

        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_unique_slug() {
        let taken: HashSet<String> = ["news".to_string(), "news-2".to_string()].into_iter().collect();
        assert_eq!(unique_slug("news", &taken), "news-3");
        assert_eq!(unique_slug("style", &taken), "style");
    }

    #[test]
    fn test_new_article_is_draft() {
        let article = Article::new("Spring Looks", "Fashion").unwrap();
        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.slug, "spring-looks");
        assert_eq!(article.category, "fashion");
        assert_eq!(article.id.len(), 8);
        assert!(article.content.is_empty());

        assert_eq!(Article::new("   ", "x"), Err(ArticleError::EmptyTitle));
    }

    #[test]
    fn test_status_transitions() {
        let mut article = Article::new("Breaking", "news").unwrap();
        article.breaking = true;

        assert!(article.unpublish().is_err());

        article.publish().unwrap();
        let first_published = article.published_at.unwrap();
        assert!(article.publish().is_err());

        article.unpublish().unwrap();
        assert_eq!(article.status, ArticleStatus::Draft);
        assert!(!article.breaking);

        article.archive().unwrap();
        assert!(article.archive().is_err());

        article.publish().unwrap();
        assert_eq!(article.published_at, Some(first_published));
    }

    #[test]
    fn test_slug_frozen_after_publish() {
        let mut article = Article::new("Draft title", "news").unwrap();
        article.set_title("Better title").unwrap();
        assert_eq!(article.slug, "better-title");

        article.publish().unwrap();
        article.set_title("Final title").unwrap();
        assert_eq!(article.slug, "better-title");
        assert_eq!(article.title, "Final title");
    }

    #[test]
    fn test_serialized_field_names() {
        let article = Article::new("Hello", "news").unwrap();
        let value = serde_json::to_value(&article).unwrap();
        assert!(value.get("editorsPick").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["status"], "draft");
    }
}
