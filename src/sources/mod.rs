//! The source selection screen: browse the catalogue with optional
//! category, language and country filters and pick the sources the news
//! screen aggregates.

mod interactor;
mod presenter;

pub use interactor::{SourceDependencies, SourceInteractor};
pub use presenter::{source_row, SourcePresenter, SourceRow, SourceView};

use crate::models::{Country, Language, Source, SourceCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Loading,
    Sources,
    Error,
}

/// Persisted catalogue filters. `None` means "all".
pub trait SourceParameterHolder {
    fn category(&self) -> Option<SourceCategory>;
    fn set_category(&mut self, category: Option<SourceCategory>);
    fn language(&self) -> Option<Language>;
    fn set_language(&mut self, language: Option<Language>);
    fn country(&self) -> Option<Country>;
    fn set_country(&mut self, country: Option<Country>);
}

/// Asks the news screen to start over after the selection changed.
pub trait NewsRefresher {
    fn refresh_news(&mut self);
}

/// The most recently loaded catalogue page.
#[derive(Debug, Default)]
pub struct SourceDataProvider {
    sources: Vec<Source>,
}

impl SourceDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, sources: Vec<Source>) {
        self.sources = sources;
    }

    /// Panics when `index` is out of range.
    pub fn source(&self, index: usize) -> &Source {
        &self.sources[index]
    }

    pub fn count(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}
