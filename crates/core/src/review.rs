//! Review payload validation and tag normalization.
//!
//! Every write goes through [`ReviewDraft::validate`] before it reaches a
//! backend, so a [`ValidatedReview`] always carries a non-empty text, a rating
//! in `1..=5` and a duplicate-free list of lowercase tags.

use serde::Deserialize;

use crate::error::CoreError;
use crate::image::validate_image_ref;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted star rating.
pub const MIN_RATING: i32 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: i32 = 5;

/// Maximum length of the review text, in characters.
pub const MAX_TEXT_LENGTH: usize = 5_000;

/// Maximum length of a single tag, in characters.
pub const MAX_TAG_LENGTH: usize = 50;

/// Maximum number of tags on one review.
pub const MAX_TAGS: usize = 20;

/// Maximum length of the free-form location.
pub const MAX_LOCATION_LENGTH: usize = 200;

/// Maximum length of the public display name.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/* --------------------------------------------------------------------------
Payloads
-------------------------------------------------------------------------- */

/// Review fields as submitted by a client, before any normalization.
///
/// `image` and `name` are accepted as aliases for `image_url` and
/// `display_name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
}

/// A review payload that passed [`ReviewDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReview {
    text: String,
    rating: i32,
    tags: Vec<String>,
    image_url: Option<String>,
    location: Option<String>,
    display_name: Option<String>,
}

impl ValidatedReview {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Lowercase, duplicate-free tags in entry order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl ReviewDraft {
    /// Check and normalize the draft.
    ///
    /// - `text` is trimmed and must not be empty.
    /// - `rating` must be in `1..=5`.
    /// - tags are trimmed, lowercased and de-duplicated.
    /// - blank `location` / `display_name` / `image_url` become `None`.
    pub fn validate(&self) -> Result<ValidatedReview, CoreError> {
        let text = validate_text(&self.text)?;
        validate_rating(self.rating)?;
        let tags = validate_tags(&self.tags)?;

        let image_url = optional_field(self.image_url.as_deref());
        if let Some(image) = &image_url {
            validate_image_ref(image)?;
        }

        let location = optional_field(self.location.as_deref());
        check_max_length("Location", location.as_deref(), MAX_LOCATION_LENGTH)?;

        let display_name = optional_field(self.display_name.as_deref());
        check_max_length("Name", display_name.as_deref(), MAX_DISPLAY_NAME_LENGTH)?;

        Ok(ValidatedReview {
            text,
            rating: self.rating,
            tags,
            image_url,
            location,
            display_name,
        })
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a rating is a whole number of stars between 1 and 5.
pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

/// Validate review text, returning the trimmed value.
pub fn validate_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Review text must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Review text exceeds maximum length of {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize a raw tag: trim and lowercase. Blank input yields `None`.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Normalize a list of raw tags, dropping blanks and later duplicates.
///
/// The first occurrence of each tag keeps its position.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.into_iter().filter_map(|t| normalize_tag(t.as_ref())) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Normalize tags and enforce the per-tag and per-review limits.
pub fn validate_tags(raw: &[String]) -> Result<Vec<String>, CoreError> {
    let tags = normalize_tags(raw);

    if let Some(long) = tags
        .iter()
        .find(|t| t.chars().count() > MAX_TAG_LENGTH)
    {
        return Err(CoreError::Validation(format!(
            "Tag '{long}' exceeds maximum length of {MAX_TAG_LENGTH} characters"
        )));
    }

    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A review may carry at most {MAX_TAGS} tags, got {}",
            tags.len()
        )));
    }

    Ok(tags)
}

/// Trim an optional free-form field; blank values become `None`.
fn optional_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_max_length(field: &str, value: Option<&str>, max: usize) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        ))),
        _ => Ok(()),
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
