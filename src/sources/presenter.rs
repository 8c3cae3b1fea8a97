use super::SourceState;
use crate::models::{Country, Language, Source, SourceCategory};

const ALL_CATEGORIES: &str = "Categories";
const ALL_LANGUAGES: &str = "Languages";
const ALL_COUNTRIES: &str = "Countries";

/// Instructions the source screen understands.
pub trait SourceView {
    fn reload_table(&mut self);
    fn reset_scroll(&mut self);
    fn set_table_hidden(&mut self, hidden: bool);
    fn set_error_hidden(&mut self, hidden: bool);
    fn animate_loading(&mut self);
    fn remove_loading_animation(&mut self);
    fn display_category(&mut self, title: &str);
    fn display_language(&mut self, title: &str);
    fn display_country(&mut self, title: &str);
    fn open_category_selector(&mut self, categories: &[SourceCategory]);
    fn open_language_selector(&mut self, languages: &[Language]);
    fn open_country_selector(&mut self, countries: &[Country]);
    fn show_cancel(&mut self);
    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub name: String,
    pub description: String,
    pub category: String,
}

pub struct SourcePresenter<V> {
    view: V,
}

impl<V: SourceView> SourcePresenter<V> {
    pub fn new(view: V) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn present(&mut self, state: SourceState) {
        match state {
            SourceState::Loading => {
                self.view.animate_loading();
                self.view.set_table_hidden(true);
                self.view.set_error_hidden(true);
            }
            SourceState::Sources => {
                self.view.reload_table();
                self.view.reset_scroll();
                self.view.set_table_hidden(false);
                self.view.set_error_hidden(true);
                self.view.remove_loading_animation();
            }
            SourceState::Error => {
                self.view.set_table_hidden(true);
                self.view.set_error_hidden(false);
                self.view.remove_loading_animation();
            }
        }
    }

    /// Show the active filters, or the "all" placeholder for unset ones.
    pub fn present_filters(
        &mut self,
        category: Option<SourceCategory>,
        language: Option<Language>,
        country: Option<Country>,
    ) {
        self.view
            .display_category(category.map_or(ALL_CATEGORIES, SourceCategory::title));
        self.view
            .display_language(language.map_or(ALL_LANGUAGES, Language::title));
        self.view
            .display_country(country.map_or(ALL_COUNTRIES, Country::title));
    }

    pub fn open_category_selector(&mut self) {
        self.view.open_category_selector(SourceCategory::ALL);
    }

    pub fn open_language_selector(&mut self) {
        self.view.open_language_selector(Language::ALL);
    }

    pub fn open_country_selector(&mut self) {
        self.view.open_country_selector(Country::ALL);
    }

    pub fn show_cancel(&mut self) {
        self.view.show_cancel();
    }

    pub fn close(&mut self) {
        self.view.close();
    }
}

pub fn source_row(source: &Source) -> SourceRow {
    SourceRow {
        name: source.name.clone(),
        description: source.description.clone(),
        category: source.category.as_str().to_string(),
    }
}
