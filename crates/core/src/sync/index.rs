//! Derived filter indexes.
//!
//! Four maps from bucket key to the set of torrent hashes whose current
//! fields satisfy that bucket's predicate. The maps hold owned copies of the
//! hashes, never references into torrents.
//!
//! Named buckets (tags, categories) exist for every known key and for every
//! key some live torrent references. A bucket for a key that is no longer
//! known is dropped when its last member leaves.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;
use tracing::trace;

use super::torrent::{Category, Torrent};
use crate::filters::{
    category_ancestors, category_buckets, status_buckets, tag_buckets, tracker_flag_buckets,
    CategoryBucket, FilterFields, StatusFilter, TagBucket, TrackerBucket,
};

/// Hashes belonging to one bucket.
pub type Bucket = HashSet<String>;

/// The four derived index maps.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterIndex {
    pub tags: HashMap<TagBucket, Bucket>,
    pub categories: HashMap<CategoryBucket, Bucket>,
    pub statuses: HashMap<StatusFilter, Bucket>,
    pub trackers: HashMap<TrackerBucket, Bucket>,
}

/// Read-only view of the snapshot state the predicates depend on.
pub(crate) struct IndexContext<'a> {
    pub torrents: &'a HashMap<String, Torrent>,
    pub tags: &'a BTreeSet<String>,
    pub categories: &'a BTreeMap<String, Category>,
    pub trackers: &'a BTreeMap<String, Vec<String>>,
    pub use_subcategories: bool,
}

impl IndexContext<'_> {
    fn is_known_tag(&self, bucket: &TagBucket) -> bool {
        match bucket {
            TagBucket::Tag(tag) => self.tags.contains(tag),
            _ => true,
        }
    }

    fn is_known_category(&self, bucket: &CategoryBucket) -> bool {
        match bucket {
            CategoryBucket::Category(name) => {
                self.categories.contains_key(name)
                    || (self.use_subcategories
                        && self.categories.keys().any(|known| {
                            known.len() > name.len()
                                && known.starts_with(name.as_str())
                                && known[name.len()..].starts_with('/')
                        }))
            }
            _ => true,
        }
    }

    /// Known category keys, plus their ancestors when subcategories are on.
    fn known_category_buckets(&self) -> Vec<CategoryBucket> {
        let mut names: BTreeSet<String> = BTreeSet::new();
        for name in self.categories.keys() {
            names.insert(name.clone());
            if self.use_subcategories {
                names.extend(category_ancestors(name));
            }
        }
        names.into_iter().map(CategoryBucket::Category).collect()
    }
}

impl Default for FilterIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterIndex {
    /// An index holding only the synthetic buckets, all empty.
    pub fn new() -> Self {
        let mut index = Self {
            tags: HashMap::new(),
            categories: HashMap::new(),
            statuses: HashMap::new(),
            trackers: HashMap::new(),
        };
        index.ensure_synthetic();
        index
    }

    fn ensure_synthetic(&mut self) {
        self.tags.entry(TagBucket::All).or_default();
        self.tags.entry(TagBucket::Untagged).or_default();
        self.categories.entry(CategoryBucket::All).or_default();
        self.categories
            .entry(CategoryBucket::Uncategorized)
            .or_default();
        for status in StatusFilter::ALL {
            self.statuses.entry(status).or_default();
        }
        for bucket in TrackerBucket::SYNTHETIC {
            self.trackers.entry(bucket).or_default();
        }
    }

    /// Build every index from scratch by evaluating the predicates against
    /// every torrent.
    pub(crate) fn build(ctx: &IndexContext<'_>) -> Self {
        let mut index = Self::new();
        for tag in ctx.tags {
            index.tags.entry(TagBucket::Tag(tag.clone())).or_default();
        }
        for bucket in ctx.known_category_buckets() {
            index.categories.entry(bucket).or_default();
        }
        for (hash, torrent) in ctx.torrents {
            index.attach_fields(hash, &torrent.filter_fields(), ctx.use_subcategories);
        }
        for (url, hashes) in ctx.trackers {
            index.set_tracker(url, hashes, ctx);
        }
        index
    }

    /// Rebuild the category dimension only.
    pub(crate) fn rebuild_categories(&mut self, ctx: &IndexContext<'_>) {
        self.categories.clear();
        self.categories.entry(CategoryBucket::All).or_default();
        self.categories
            .entry(CategoryBucket::Uncategorized)
            .or_default();
        for bucket in ctx.known_category_buckets() {
            self.categories.entry(bucket).or_default();
        }
        for (hash, torrent) in ctx.torrents {
            attach(
                &mut self.categories,
                category_buckets(&torrent.category, ctx.use_subcategories),
                hash,
            );
        }
    }

    /// Insert a newly created torrent into every bucket whose predicate holds.
    pub(crate) fn insert_torrent(&mut self, hash: &str, fields: &FilterFields, ctx: &IndexContext<'_>) {
        self.attach_fields(hash, fields, ctx.use_subcategories);
        for (url, hashes) in ctx.trackers {
            if hashes.iter().any(|h| h == hash) {
                attach(&mut self.trackers, [TrackerBucket::Url(url.clone())], hash);
            }
        }
    }

    /// Remove a torrent from the buckets implied by its last known fields.
    pub(crate) fn remove_torrent(&mut self, hash: &str, fields: &FilterFields, ctx: &IndexContext<'_>) {
        self.detach_fields(hash, fields, ctx);
        for (url, hashes) in ctx.trackers {
            if hashes.iter().any(|h| h == hash) {
                if let Some(bucket) = self.trackers.get_mut(&TrackerBucket::Url(url.clone())) {
                    bucket.remove(hash);
                }
            }
        }
    }

    /// Move a torrent from the buckets implied by `before` to the buckets
    /// implied by `after`.
    ///
    /// Tracker URL buckets are untouched: their membership comes from the
    /// server's tracker lists, not from the torrent's fields.
    pub(crate) fn patch_torrent(
        &mut self,
        hash: &str,
        before: &FilterFields,
        after: &FilterFields,
        ctx: &IndexContext<'_>,
    ) {
        trace!(hash, "patching filter buckets");
        self.detach_fields(hash, before, ctx);
        self.attach_fields(hash, after, ctx.use_subcategories);
    }

    /// Make sure a bucket exists for a newly known tag.
    pub(crate) fn add_tag(&mut self, tag: &str) {
        self.tags.entry(TagBucket::Tag(tag.to_string())).or_default();
    }

    /// Drop a tag bucket if nothing references it any more.
    pub(crate) fn prune_tag(&mut self, tag: &str, ctx: &IndexContext<'_>) {
        prune(&mut self.tags, &TagBucket::Tag(tag.to_string()), |bucket| {
            ctx.is_known_tag(bucket)
        });
    }

    /// Make sure buckets exist for a newly known category and, with
    /// subcategories on, its ancestors.
    pub(crate) fn add_category(&mut self, name: &str, use_subcategories: bool) {
        self.categories
            .entry(CategoryBucket::Category(name.to_string()))
            .or_default();
        if use_subcategories {
            for ancestor in category_ancestors(name) {
                self.categories
                    .entry(CategoryBucket::Category(ancestor))
                    .or_default();
            }
        }
    }

    /// Drop the buckets of a removed category (and its ancestors) that
    /// nothing references any more.
    pub(crate) fn prune_category(&mut self, name: &str, ctx: &IndexContext<'_>) {
        let mut names = vec![name.to_string()];
        names.extend(category_ancestors(name));
        for name in names {
            prune(&mut self.categories, &CategoryBucket::Category(name), |bucket| {
                ctx.is_known_category(bucket)
            });
        }
    }

    /// Replace a tracker URL bucket with the server's list, keeping only
    /// hashes of live torrents. Returns how many hashes were excluded.
    pub(crate) fn set_tracker(&mut self, url: &str, hashes: &[String], ctx: &IndexContext<'_>) -> usize {
        let bucket: Bucket = hashes
            .iter()
            .filter(|hash| ctx.torrents.contains_key(hash.as_str()))
            .cloned()
            .collect();
        let excluded = hashes.len() - bucket.len();
        self.trackers.insert(TrackerBucket::Url(url.to_string()), bucket);
        excluded
    }

    pub(crate) fn remove_tracker(&mut self, url: &str) {
        self.trackers.remove(&TrackerBucket::Url(url.to_string()));
    }

    fn attach_fields(&mut self, hash: &str, fields: &FilterFields, use_subcategories: bool) {
        attach(&mut self.tags, tag_buckets(&fields.tags), hash);
        attach(
            &mut self.categories,
            category_buckets(&fields.category, use_subcategories),
            hash,
        );
        attach(&mut self.statuses, status_buckets(fields), hash);
        attach(&mut self.trackers, tracker_flag_buckets(fields), hash);
    }

    fn detach_fields(&mut self, hash: &str, fields: &FilterFields, ctx: &IndexContext<'_>) {
        detach(&mut self.tags, tag_buckets(&fields.tags), hash, |bucket| {
            ctx.is_known_tag(bucket)
        });
        detach(
            &mut self.categories,
            category_buckets(&fields.category, ctx.use_subcategories),
            hash,
            |bucket| ctx.is_known_category(bucket),
        );
        detach(&mut self.statuses, status_buckets(fields), hash, |_| true);
        detach(&mut self.trackers, tracker_flag_buckets(fields), hash, |_| true);
    }

    /// Number of members per bucket, for logging and reports.
    pub fn sizes(&self) -> IndexSizes {
        IndexSizes {
            tags: split_count(&self.tags, TagBucket::name),
            categories: split_count(&self.categories, CategoryBucket::name),
            statuses: count(&self.statuses),
            trackers: split_count(&self.trackers, TrackerBucket::url),
        }
    }
}

/// Bucket sizes keyed by bucket label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSizes {
    pub tags: DimensionSizes,
    pub categories: DimensionSizes,
    pub statuses: BTreeMap<String, usize>,
    pub trackers: DimensionSizes,
}

/// Sizes of one dimension, with the built-in buckets kept apart from the
/// server-named ones so a tag called `[all]` cannot shadow the real `[all]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DimensionSizes {
    pub builtin: BTreeMap<String, usize>,
    pub named: BTreeMap<String, usize>,
}

impl IndexSizes {
    /// Drop every empty bucket.
    pub fn without_empty(mut self) -> Self {
        for sizes in [
            &mut self.tags.builtin,
            &mut self.tags.named,
            &mut self.categories.builtin,
            &mut self.categories.named,
            &mut self.statuses,
            &mut self.trackers.builtin,
            &mut self.trackers.named,
        ] {
            sizes.retain(|_, size| *size > 0);
        }
        self
    }
}

fn count<K: ToString>(buckets: &HashMap<K, Bucket>) -> BTreeMap<String, usize> {
    buckets
        .iter()
        .map(|(key, bucket)| (key.to_string(), bucket.len()))
        .collect()
}

fn split_count<K, F>(buckets: &HashMap<K, Bucket>, name: F) -> DimensionSizes
where
    K: ToString,
    F: Fn(&K) -> Option<&str>,
{
    let mut sizes = DimensionSizes::default();
    for (key, bucket) in buckets {
        match name(key) {
            Some(name) => sizes.named.insert(name.to_string(), bucket.len()),
            None => sizes.builtin.insert(key.to_string(), bucket.len()),
        };
    }
    sizes
}

fn attach<K, I>(buckets: &mut HashMap<K, Bucket>, keys: I, hash: &str)
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    for key in keys {
        buckets.entry(key).or_default().insert(hash.to_string());
    }
}

fn detach<K, I, F>(buckets: &mut HashMap<K, Bucket>, keys: I, hash: &str, is_known: F)
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
    F: Fn(&K) -> bool,
{
    for key in keys {
        if let Some(bucket) = buckets.get_mut(&key) {
            bucket.remove(hash);
            if bucket.is_empty() && !is_known(&key) {
                buckets.remove(&key);
            }
        }
    }
}

fn prune<K, F>(buckets: &mut HashMap<K, Bucket>, key: &K, is_known: F)
where
    K: Eq + Hash,
    F: Fn(&K) -> bool,
{
    if buckets.get(key).is_some_and(|bucket| bucket.is_empty()) && !is_known(key) {
        buckets.remove(key);
    }
}
