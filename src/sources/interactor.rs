use super::presenter::{SourcePresenter, SourceView};
use super::{NewsRefresher, SourceDataProvider, SourceParameterHolder, SourceState};
use crate::api::{Loaded, SourceFilter, SourceLoading};
use crate::models::{Country, Language, SelectedSource, Source, SourceCategory};
use crate::news::SourceHolder;

pub struct SourceDependencies {
    pub loader: Box<dyn SourceLoading>,
    pub source_holder: Box<dyn SourceHolder>,
    pub parameters: Box<dyn SourceParameterHolder>,
    pub refresher: Box<dyn NewsRefresher>,
}

/// Drives the source selection screen.
///
/// The selection is kept in tap order and only written back on
/// [`confirm`](Self::confirm).
pub struct SourceInteractor<V> {
    deps: SourceDependencies,
    presenter: SourcePresenter<V>,
    data: SourceDataProvider,
    selection: Vec<SelectedSource>,
    pending: Option<u64>,
}

impl<V: SourceView> SourceInteractor<V> {
    pub fn new(deps: SourceDependencies, view: V) -> Self {
        Self {
            deps,
            presenter: SourcePresenter::new(view),
            data: SourceDataProvider::new(),
            selection: Vec::new(),
            pending: None,
        }
    }

    pub fn presenter(&self) -> &SourcePresenter<V> {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut SourcePresenter<V> {
        &mut self.presenter
    }

    pub fn sources(&self) -> &[Source] {
        self.data.sources()
    }

    pub fn selection(&self) -> &[SelectedSource] {
        &self.selection
    }

    pub fn is_selected(&self, source: &Source) -> bool {
        self.selection.iter().any(|s| s.id == source.id)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn filter(&self) -> SourceFilter {
        SourceFilter {
            category: self.deps.parameters.category(),
            language: self.deps.parameters.language(),
            country: self.deps.parameters.country(),
        }
    }

    /// Screen opened: start from the saved selection and load the catalogue.
    pub fn on_did_load(&mut self) {
        let saved = self.deps.source_holder.selected_sources().unwrap_or_default();
        let has_selection = !saved.is_empty();
        self.selection = saved;

        self.load_sources();
        self.present_filters();
        if has_selection {
            self.presenter.show_cancel();
        }
    }

    pub fn refresh(&mut self) {
        self.load_sources();
    }

    fn load_sources(&mut self) {
        self.presenter.present(SourceState::Loading);
        let filter = self.filter();
        let generation = self.deps.loader.load(filter);
        tracing::debug!(?filter, generation, "Loading sources");
        self.pending = Some(generation);
    }

    fn present_filters(&mut self) {
        let filter = self.filter();
        self.presenter
            .present_filters(filter.category, filter.language, filter.country);
    }

    pub fn on_sources_loaded(&mut self, loaded: Loaded<Source>) {
        if !self.deps.loader.is_current(loaded.generation)
            || self.pending != Some(loaded.generation)
        {
            tracing::debug!(
                generation = loaded.generation,
                "Ignoring stale source load"
            );
            return;
        }
        self.pending = None;

        let state = if loaded.items.is_empty() {
            SourceState::Error
        } else {
            SourceState::Sources
        };
        tracing::debug!(count = loaded.items.len(), "Sources loaded");
        self.data.save(loaded.items);
        self.presenter.present(state);
    }

    pub fn select_category(&mut self) {
        self.presenter.open_category_selector();
    }

    pub fn select_language(&mut self) {
        self.presenter.open_language_selector();
    }

    pub fn select_country(&mut self) {
        self.presenter.open_country_selector();
    }

    pub fn category_selected(&mut self, category: Option<SourceCategory>) {
        self.deps.parameters.set_category(category);
        self.load_sources();
        self.present_filters();
    }

    pub fn language_selected(&mut self, language: Option<Language>) {
        self.deps.parameters.set_language(language);
        self.load_sources();
        self.present_filters();
    }

    pub fn country_selected(&mut self, country: Option<Country>) {
        self.deps.parameters.set_country(country);
        self.load_sources();
        self.present_filters();
    }

    /// Add the source at `index` to the selection, or drop it if present.
    pub fn toggle_source(&mut self, index: usize) {
        let picked = self.data.source(index).selection();
        match self.selection.iter().position(|s| s.id == picked.id) {
            Some(position) => {
                self.selection.remove(position);
            }
            None => self.selection.push(picked),
        }
    }

    /// Persist the selection and hand control back to the news screen.
    ///
    /// Does nothing while the selection is empty.
    pub fn confirm(&mut self) {
        if self.selection.is_empty() {
            tracing::debug!("Confirm with empty selection ignored");
            return;
        }
        tracing::info!(sources = self.selection.len(), "Saving source selection");
        self.deps.source_holder.save(&self.selection);
        self.deps.refresher.refresh_news();
        self.presenter.close();
    }

    pub fn cancel(&mut self) {
        self.presenter.close();
    }
}
