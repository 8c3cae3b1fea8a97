use std::collections::HashMap;

use crate::models::Article;

/// What the last [`NewsStore::add`] did, so the view can update minimally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewsStoreChange {
    /// The store was empty; everything must be redrawn.
    #[default]
    Reload,
    /// A new section was appended with this many rows.
    NewSource(usize),
    /// The section at `.0` gained `.1` rows at its end.
    AddNewsToSource(usize, usize),
}

struct Section {
    name: String,
    articles: Vec<Article>,
}

/// Articles of the current browsing session grouped by source name.
///
/// Sections keep first-seen order. Indexing methods expect valid indices and
/// panic otherwise.
#[derive(Default)]
pub struct NewsStore {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
    last_change: NewsStoreChange,
}

impl NewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch under `source_name` and classify the change.
    pub fn add(&mut self, articles: Vec<Article>, source_name: &str) {
        let was_empty = self.count() == 0;
        let added = articles.len();

        let change = match self.index.get(source_name) {
            Some(&section) => {
                self.sections[section].articles.extend(articles);
                NewsStoreChange::AddNewsToSource(section, added)
            }
            None => {
                self.index
                    .insert(source_name.to_string(), self.sections.len());
                self.sections.push(Section {
                    name: source_name.to_string(),
                    articles,
                });
                NewsStoreChange::NewSource(added)
            }
        };

        self.last_change = if was_empty {
            NewsStoreChange::Reload
        } else {
            change
        };
    }

    /// Drop all sections. The last change is left as it was.
    pub fn clear(&mut self) {
        self.sections.clear();
        self.index.clear();
    }

    pub fn last_change(&self) -> NewsStoreChange {
        self.last_change
    }

    /// Total number of articles across all sections.
    pub fn count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    pub fn count_in(&self, section: usize) -> usize {
        self.sections[section].articles.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn article(&self, index: usize, section: usize) -> &Article {
        &self.sections[section].articles[index]
    }

    /// Display name of a section.
    pub fn source(&self, section: usize) -> &str {
        &self.sections[section].name
    }

    pub fn section_of(&self, source_name: &str) -> Option<usize> {
        self.index.get(source_name).copied()
    }
}
