use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;

static CLASSIFICATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)*)\.?\s+(\S.*)$").expect("valid regex"));

/// One code of the question bank's content classifier, e.g. `3.2.1 Logic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: String,
    pub text: String,
    /// Leading integer of `id`.
    pub section: u32,
}

impl ReferenceEntry {
    /// Parses `"<dotted id> <text>"`; anything else is not a classification code.
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = CLASSIFICATION.captures(raw.trim())?;
        let id = caps[1].to_string();
        let section = id.split('.').next()?.parse().ok()?;
        Some(Self {
            text: caps[2].trim().to_string(),
            id,
            section,
        })
    }
}

/// Numeric path of a dotted id, for ordering `2.10` after `2.9`.
fn numeric_path(id: &str) -> Vec<u64> {
    id.split('.')
        .map(|part| part.parse().unwrap_or(u64::MAX))
        .collect()
}

/// Classification entries of one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedReferences {
    pub entries: Vec<ReferenceEntry>,
    pub unrecognized: usize,
}

impl ExtractedReferences {
    /// Ids in first-seen order without repeats.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !codes.contains(&entry.id) {
                codes.push(entry.id.clone());
            }
        }
        codes
    }
}

pub fn extract_references<S: AsRef<str>>(classifications: &[S]) -> ExtractedReferences {
    let mut extracted = ExtractedReferences::default();
    for raw in classifications {
        let raw = raw.as_ref();
        match ReferenceEntry::parse(raw) {
            Some(entry) => extracted.entries.push(entry),
            None => {
                log::debug!("Skipping unrecognized classification entry {raw:?}");
                extracted.unrecognized += 1;
            }
        }
    }
    extracted
}

/// Batch-wide lookup of classification codes.
///
/// Every distinct text seen for an id is remembered, so the winner (longest
/// text, ties going to the lexicographically smaller one) and the conflict
/// count do not depend on the order tables are filled or merged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    variants: BTreeMap<String, BTreeSet<String>>,
    unrecognized: usize,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ReferenceEntry) {
        let texts = self.variants.entry(entry.id).or_default();
        if !texts.is_empty() && !texts.contains(&entry.text) {
            log::debug!("Conflicting text {:?} for a known classification id", entry.text);
        }
        texts.insert(entry.text);
    }

    pub fn record(&mut self, extracted: ExtractedReferences) {
        self.unrecognized += extracted.unrecognized;
        for entry in extracted.entries {
            self.insert(entry);
        }
    }

    pub fn merge(&mut self, other: ReferenceTable) {
        self.unrecognized += other.unrecognized;
        for (id, texts) in other.variants {
            self.variants.entry(id).or_default().extend(texts);
        }
    }

    /// Number of losing texts across all ids.
    pub fn conflicts(&self) -> usize {
        self.variants.values().map(|texts| texts.len().saturating_sub(1)).sum()
    }

    pub fn unrecognized(&self) -> usize {
        self.unrecognized
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<ReferenceEntry> {
        let texts = self.variants.get(id)?;
        entry_for(id, texts)
    }

    /// Winning entries ordered by numeric id path.
    pub fn entries(&self) -> Vec<ReferenceEntry> {
        let mut entries: Vec<ReferenceEntry> = self
            .variants
            .iter()
            .filter_map(|(id, texts)| entry_for(id, texts))
            .collect();
        entries.sort_by(|a, b| {
            numeric_path(&a.id)
                .cmp(&numeric_path(&b.id))
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries())?)
    }
}

fn entry_for(id: &str, texts: &BTreeSet<String>) -> Option<ReferenceEntry> {
    // BTreeSet iterates in ascending order, so `min_by_key` on the negated
    // length keeps the smallest text among the longest ones.
    let text = texts
        .iter()
        .min_by_key(|text| std::cmp::Reverse(text.chars().count()))?;
    let section = id.split('.').next()?.parse().ok()?;
    Some(ReferenceEntry {
        id: id.to_string(),
        text: text.clone(),
        section,
    })
}
