//! Core data structures for the quotebin application.
//!
//! This module contains the `Quote` record stored in the remote bin, the
//! `NewQuote` draft used to create one, and slug derivation.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{QuoteError, Result, Settings};

/// Maximum length of a derived slug, in characters.
pub const SLUG_MAX_LEN: usize = 50;

/// Represents a single captured quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Unique identifier for the quote (creation time in milliseconds)
    pub id: String,
    /// Quote body
    pub text: String,
    /// Attribution
    pub author: String,
    /// Font family snapshotted at creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in pixels snapshotted at creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// URL-safe identifier derived from text and author
    #[serde(default)]
    pub slug: String,
    /// When the quote was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for creating a quote. Font and size fall back to the current settings.
#[derive(Debug, Clone, Default)]
pub struct NewQuote {
    pub text: String,
    pub author: String,
    pub font: Option<String>,
    pub size: Option<u32>,
}

impl NewQuote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            font: None,
            size: None,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

impl Quote {
    /// Builds a quote from a draft, snapshotting display defaults from `settings`.
    pub fn new(draft: NewQuote, settings: &Settings) -> Result<Self> {
        if draft.text.trim().is_empty() {
            return Err(QuoteError::InvalidQuote {
                message: "quote text is required".to_string(),
            });
        }
        if draft.author.trim().is_empty() {
            return Err(QuoteError::InvalidQuote {
                message: "author is required".to_string(),
            });
        }

        let now = Utc::now();
        let slug = derive_slug(&draft.text, &draft.author);

        Ok(Quote {
            id: now.timestamp_millis().to_string(),
            font: Some(draft.font.unwrap_or_else(|| settings.font_family.clone())),
            size: Some(draft.size.unwrap_or(settings.font_size)),
            text: draft.text,
            author: draft.author,
            slug,
            created_at: Some(now),
        })
    }
}

/// Slug for a quote: `slugify("{text} {author}")` cut to [`SLUG_MAX_LEN`] characters.
pub fn derive_slug(text: &str, author: &str) -> String {
    slugify(&format!("{} {}", text, author))
        .chars()
        .take(SLUG_MAX_LEN)
        .collect()
}

/// Lowercases, strips non-word characters, and joins words with single hyphens.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.trim().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}
