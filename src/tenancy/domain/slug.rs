//! URL-safe slugs derived from human-readable names.

use super::TenancyDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum slug length, matching `VARCHAR(100)`.
const MAX_SLUG_LENGTH: usize = 100;

/// Lowercases `value` and collapses every run of non-alphanumeric
/// characters into a single dash, trimming dashes at both ends.
///
/// `"My New Lane"` becomes `"my-new-lane"`.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Validated slug: non-empty, `[a-z0-9-]`, no leading or trailing dash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Validates an explicit slug.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::InvalidSlug`] when the value is empty,
    /// too long, or not already in canonical slug form.
    pub fn new(value: impl Into<String>) -> Result<Self, TenancyDomainError> {
        let raw = value.into();
        let is_canonical = !raw.is_empty()
            && raw.len() <= MAX_SLUG_LENGTH
            && raw
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
            && !raw.starts_with('-')
            && !raw.ends_with('-')
            && !raw.contains("--");
        if !is_canonical {
            return Err(TenancyDomainError::InvalidSlug(raw));
        }
        Ok(Self(raw))
    }

    /// Derives a slug from a display name.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::InvalidSlug`] when the name contains no
    /// ASCII alphanumeric characters.
    pub fn derive(name: &str) -> Result<Self, TenancyDomainError> {
        let derived: String = slugify(name).chars().take(MAX_SLUG_LENGTH).collect();
        Self::new(derived.trim_end_matches('-').to_owned())
            .map_err(|_| TenancyDomainError::InvalidSlug(name.to_owned()))
    }

    /// Returns the slug as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
