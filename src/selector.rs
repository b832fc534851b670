//! Palette listings and the usage counts that rank them.
use crate::catalog::{Catalog, NodeRole};
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// How many of the most used entries float to the top of a listing.
pub const PREFERRED_LIMIT: usize = 5;

/// Key -> usage count. Plain data, so the host can persist it however it likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStore {
    #[serde(default)]
    counts: AHashMap<String, u64>,
}

impl UsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// The `n` most used keys, most used first. Ties are ordered by key.
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, count)| (key.as_str(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Element,
    Component,
    Kamelet,
}

/// One line of the palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorEntry {
    /// What to pass to `Catalog::instantiate`: a type tag or a pseudo-type.
    pub key: String,
    /// The real type the entry creates.
    pub type_tag: String,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub kind: EntryKind,
    pub uses: u64,
    pub preferred: bool,
}

impl SelectorEntry {
    fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim().to_lowercase();
        filter.is_empty()
            || self.title.to_lowercase().contains(&filter)
            || self.key.to_lowercase().contains(&filter)
    }
}

pub struct Selector;

impl Selector {
    /// What may be added to `parent_type.slot`, most used first.
    ///
    /// Component and kamelet entries appear wherever the type they create is allowed.
    pub fn entries(
        catalog: &Catalog,
        parent_type: &str,
        slot: &str,
        usage: &UsageStore,
        filter: &str,
    ) -> Vec<SelectorEntry> {
        let elements = catalog
            .allowed_child_types(parent_type, slot)
            .into_iter()
            .map(|d| SelectorEntry {
                key: d.type_tag.clone(),
                type_tag: d.type_tag.clone(),
                title: d.title.clone(),
                description: d.description.clone(),
                labels: d.labels.clone(),
                kind: EntryKind::Element,
                uses: 0,
                preferred: false,
            });
        let pseudo = pseudo_entries(catalog)
            .into_iter()
            .filter(|e| catalog.allows_child(parent_type, slot, &e.type_tag));

        rank(elements.chain(pseudo).collect(), usage, filter)
    }

    /// What may be added at document level: roots, plus anything that gets a
    /// root wrapper (a `From` becomes a route, a REST verb a REST service).
    pub fn root_entries(
        catalog: &Catalog,
        usage: &UsageStore,
        filter: &str,
    ) -> Vec<SelectorEntry> {
        let at_root = |type_tag: &str| {
            catalog
                .resolve(type_tag)
                .is_some_and(|d| d.role == NodeRole::Root)
                || catalog.root_wrapper(type_tag).is_some()
        };
        let elements = catalog
            .descriptors()
            .filter(|d| at_root(&d.type_tag))
            .map(|d| SelectorEntry {
                key: d.type_tag.clone(),
                type_tag: d.type_tag.clone(),
                title: d.title.clone(),
                description: d.description.clone(),
                labels: d.labels.clone(),
                kind: EntryKind::Element,
                uses: 0,
                preferred: false,
            })
            .collect_vec();
        let pseudo = pseudo_entries(catalog)
            .into_iter()
            .filter(|e| at_root(&e.type_tag));

        rank(elements.into_iter().chain(pseudo).collect(), usage, filter)
    }
}

fn pseudo_entries(catalog: &Catalog) -> Vec<SelectorEntry> {
    catalog
        .pseudo_types()
        .into_iter()
        .map(|p| {
            let kind = if p.tag.starts_with("kamelet:") {
                EntryKind::Kamelet
            } else {
                EntryKind::Component
            };
            SelectorEntry {
                key: p.tag,
                type_tag: p.base,
                title: p.title,
                description: p.description,
                labels: p.labels,
                kind,
                uses: 0,
                preferred: false,
            }
        })
        .collect()
}

fn rank(entries: Vec<SelectorEntry>, usage: &UsageStore, filter: &str) -> Vec<SelectorEntry> {
    let mut entries: Vec<SelectorEntry> = entries
        .into_iter()
        .filter(|e| e.matches(filter))
        .map(|mut e| {
            e.uses = usage.count(&e.key);
            e
        })
        .collect();

    let preferred: Vec<String> = entries
        .iter()
        .filter(|e| e.uses > 0)
        .sorted_by(|a, b| b.uses.cmp(&a.uses).then_with(|| a.key.cmp(&b.key)))
        .take(PREFERRED_LIMIT)
        .map(|e| e.key.clone())
        .collect();
    for e in &mut entries {
        e.preferred = preferred.contains(&e.key);
    }

    // Stable: everything that is not preferred keeps catalog order.
    entries.sort_by(|a, b| match (a.preferred, b.preferred) {
        (true, true) => b.uses.cmp(&a.uses).then_with(|| a.key.cmp(&b.key)),
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => std::cmp::Ordering::Equal,
    });
    entries
}

