use std::collections::HashSet;

use scraper::Html;

use crate::catalog::SkillCatalog;
use crate::job::JobRecord;
use crate::skill::SkillFact;

/// Pure extractor: one job record in, ordered de-duplicated skill facts out.
///
/// No network or storage access; the same record always yields the same
/// facts in the same order.
#[derive(Debug, Clone)]
pub struct TextSkillExtractor {
    catalog: SkillCatalog,
}

impl Default for TextSkillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSkillExtractor {
    /// Extractor over the built-in catalog.
    pub fn new() -> Self {
        Self {
            catalog: SkillCatalog::builtin(),
        }
    }

    /// Extractor over a custom catalog.
    pub fn with_catalog(catalog: SkillCatalog) -> Self {
        Self { catalog }
    }

    /// Extracts normalized skill facts from one job record.
    ///
    /// Emission order is stable: the speciality fact first, then label-pass
    /// tokens, then catalog matches. Duplicates by case-insensitive name
    /// keep the first occurrence.
    pub fn extract(&self, job: &JobRecord) -> Vec<SkillFact> {
        let mut facts = Vec::new();

        if let Some(speciality) = non_empty(job.speciality.as_deref()) {
            facts.push(SkillFact::speciality(speciality));
        }

        if let Some(description) = non_empty(job.description.as_deref()) {
            let text = strip_markup(description);
            self.collect_labeled(&text, &mut facts);
            self.collect_catalog(&text, &mut facts);
        }

        dedupe_by_name(facts)
    }

    fn collect_labeled(&self, text: &str, facts: &mut Vec<SkillFact>) {
        for list in self.catalog.label_captures(text) {
            for token in self.catalog.split_list(list) {
                let token = token.trim();
                // Single-character tokens are noise, not skills.
                if token.chars().count() > 1 && !self.catalog.is_stopword(token) {
                    facts.push(SkillFact::technology(token));
                }
            }
        }
    }

    fn collect_catalog(&self, text: &str, facts: &mut Vec<SkillFact>) {
        for found in self.catalog.tech_matches(text) {
            facts.push(SkillFact::technology(found));
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Best-effort plain text from a description that may contain markup.
///
/// The fragment parser is error-correcting, so malformed markup degrades to
/// whatever text survives instead of failing the item.
fn strip_markup(description: &str) -> String {
    let fragment = Html::parse_fragment(description);
    fragment.root_element().text().collect::<String>()
}

fn dedupe_by_name(facts: Vec<SkillFact>) -> Vec<SkillFact> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(facts.len());
    for fact in facts {
        if seen.insert(fact.normalized_name()) {
            unique.push(fact);
        }
    }
    unique
}
