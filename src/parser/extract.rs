use std::collections::BTreeMap;

use scraper::Html;
use tracing::{debug, warn};

use super::items::extract_items;
use super::labels::{LabelSet, SectionKind};
use super::locate::locate_lists;
use super::validate::{accept, NumeralPolicy};
use crate::config::Settings;
use crate::error::ExtractError;

/// Items of one accepted list, in document order. Never holds empty strings.
pub type ExtractedList = Vec<String>;

pub type ExtractionResult = Result<Vec<ExtractedList>, ExtractError>;

pub type SectionResults = BTreeMap<SectionKind, ExtractionResult>;

/// Label-driven list extraction, configured once and reused across pages.
#[derive(Debug, Clone)]
pub struct Extractor {
    ingredients: LabelSet,
    instructions: LabelSet,
    excluded_tags: Vec<String>,
    numerals: NumeralPolicy,
}

impl Extractor {
    pub fn new(settings: &Settings) -> Self {
        let extractor = Extractor {
            ingredients: LabelSet::new(settings.labels.for_kind(SectionKind::Ingredients)),
            instructions: LabelSet::new(settings.labels.for_kind(SectionKind::Instructions)),
            excluded_tags: settings.extract.excluded_tags.clone(),
            numerals: settings.extract.numerals,
        };
        for kind in SectionKind::ALL {
            if extractor.labels(kind).is_empty() {
                warn!(section = %kind, "no labels configured, section will never match");
            }
        }
        extractor
    }

    fn labels(&self, kind: SectionKind) -> &LabelSet {
        match kind {
            SectionKind::Ingredients => &self.ingredients,
            SectionKind::Instructions => &self.instructions,
        }
    }

    /// Section kind whose label set matches `text`, if any.
    pub fn label_kind(&self, text: &str) -> Option<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .find(|&kind| self.labels(kind).matches(text))
    }

    /// Lists for one section kind, or `NotFound` when no label resolved to a
    /// list or every candidate was rejected.
    pub fn extract(&self, doc: &Html, kind: SectionKind) -> ExtractionResult {
        let candidates = locate_lists(doc.root_element(), self.labels(kind));
        let total = candidates.len();

        let lists: Vec<ExtractedList> = candidates
            .into_iter()
            .map(|node| extract_items(node, &self.excluded_tags))
            .filter(|items| {
                let keep = accept(kind, items, self.numerals);
                if !keep {
                    debug!(section = %kind, items = items.len(), "rejected candidate list");
                }
                keep
            })
            .collect();

        debug!(section = %kind, candidates = total, accepted = lists.len(), "section resolved");
        if lists.is_empty() {
            return Err(ExtractError::NotFound(kind));
        }
        Ok(lists)
    }

    /// Each kind is resolved independently; one kind failing does not affect
    /// the others.
    pub fn extract_sections(&self, doc: &Html, kinds: &[SectionKind]) -> SectionResults {
        kinds.iter().map(|&kind| (kind, self.extract(doc, kind))).collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new(&Settings::default())
    }
}

// ── Tests ──
