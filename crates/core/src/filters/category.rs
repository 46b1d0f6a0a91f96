//! Category buckets and the subcategory hierarchy.

use std::fmt;

use serde::Serialize;

/// Separator between category path segments.
pub const CATEGORY_SEPARATOR: char = '/';

/// Key of a category bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryBucket {
    All,
    Uncategorized,
    Category(String),
}

impl CategoryBucket {
    /// The category name, `None` for built-in buckets.
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryBucket::Category(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether a torrent in `category` belongs to this bucket.
    pub fn matches(&self, category: &str, use_subcategories: bool) -> bool {
        match self {
            CategoryBucket::All => true,
            CategoryBucket::Uncategorized => category.is_empty(),
            CategoryBucket::Category(name) => category_chain(category, use_subcategories)
                .iter()
                .any(|c| c == name),
        }
    }
}

impl fmt::Display for CategoryBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryBucket::All => f.write_str("[all]"),
            CategoryBucket::Uncategorized => f.write_str("[uncategorized]"),
            CategoryBucket::Category(name) => f.write_str(name),
        }
    }
}

/// Proper ancestors of a category, nearest first.
///
/// `"A/B/C"` yields `["A/B", "A"]`.
pub fn category_ancestors(category: &str) -> Vec<String> {
    let mut ancestors = Vec::new();
    let mut current = category;
    while let Some(pos) = current.rfind(CATEGORY_SEPARATOR) {
        current = &current[..pos];
        if !current.is_empty() {
            ancestors.push(current.to_string());
        }
    }
    ancestors
}

/// The category itself followed by its ancestors when subcategories are on.
///
/// Empty for an uncategorized torrent.
pub fn category_chain(category: &str, use_subcategories: bool) -> Vec<String> {
    if category.is_empty() {
        return Vec::new();
    }
    let mut chain = vec![category.to_string()];
    if use_subcategories {
        chain.extend(category_ancestors(category));
    }
    chain
}

/// Buckets a torrent in `category` belongs to.
pub fn category_buckets(category: &str, use_subcategories: bool) -> Vec<CategoryBucket> {
    let mut buckets = vec![CategoryBucket::All];
    if category.is_empty() {
        buckets.push(CategoryBucket::Uncategorized);
    } else {
        buckets.extend(
            category_chain(category, use_subcategories)
                .into_iter()
                .map(CategoryBucket::Category),
        );
    }
    buckets
}
