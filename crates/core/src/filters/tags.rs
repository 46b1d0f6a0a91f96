//! Tag normalization and tag buckets.

use std::fmt;

use serde::Serialize;

/// Separator between a tag's display name and any suffix the server appends.
pub const TAG_SUFFIX_SEPARATOR: char = '\t';

/// Normalize a raw tag: keep the part before the first separator, trimmed.
///
/// Returns `None` when nothing is left, in which case the tag is dropped.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let head = raw.split(TAG_SUFFIX_SEPARATOR).next().unwrap_or_default();
    let trimmed = head.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a list of raw tags into an ordered, deduplicated list.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        if let Some(tag) = normalize_tag(tag.as_ref()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Key of a tag bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagBucket {
    All,
    Untagged,
    Tag(String),
}

impl TagBucket {
    /// The tag name, `None` for built-in buckets.
    pub fn name(&self) -> Option<&str> {
        match self {
            TagBucket::Tag(tag) => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Whether a torrent carrying `tags` belongs to this bucket.
    pub fn matches(&self, tags: &[String]) -> bool {
        match self {
            TagBucket::All => true,
            TagBucket::Untagged => tags.is_empty(),
            TagBucket::Tag(tag) => tags.contains(tag),
        }
    }
}

impl fmt::Display for TagBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagBucket::All => f.write_str("[all]"),
            TagBucket::Untagged => f.write_str("[untagged]"),
            TagBucket::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Buckets a torrent carrying `tags` belongs to.
pub fn tag_buckets(tags: &[String]) -> Vec<TagBucket> {
    let mut buckets = Vec::with_capacity(tags.len() + 1);
    buckets.push(TagBucket::All);
    if tags.is_empty() {
        buckets.push(TagBucket::Untagged);
    }
    buckets.extend(tags.iter().cloned().map(TagBucket::Tag));
    buckets
}
