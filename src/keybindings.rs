//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are looked up per screen context with a fallback to the global
//! context. Users can rebind actions from the `[keybindings]` table of
//! config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    Select,
    Back,
    Refresh,
    ShowHelp,
    ShowActions,
    ToggleFavorite,
    ToggleSegment,
    NotificationSettings,
    EditSources,
    ToggleSource,
    ConfirmSources,
    FilterCategory,
    FilterLanguage,
    FilterCountry,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::Select => "Open article / choose entry",
            Self::Back => "Go back / dismiss",
            Self::Refresh => "Reload",
            Self::ShowHelp => "Show help",
            Self::ShowActions => "Article actions",
            Self::ToggleFavorite => "Toggle favorite",
            Self::ToggleSegment => "Switch News / Favorites",
            Self::NotificationSettings => "Digest notification settings",
            Self::EditSources => "Choose sources",
            Self::ToggleSource => "Select / deselect source",
            Self::ConfirmSources => "Save selection",
            Self::FilterCategory => "Filter by category",
            Self::FilterLanguage => "Filter by language",
            Self::FilterCountry => "Filter by country",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    News,
    Sources,
    Overlay,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "?"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Space"
/// - Modifier combos: "Ctrl+d", "Ctrl+r"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "pageup" => return Some(KeySpec::plain(KeyCode::PageUp)),
        "pagedown" => return Some(KeySpec::plain(KeyCode::PageDown)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = n.parse::<u8>() {
            return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; a miss
/// in the specific context falls back to [`Context::Global`].
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Context::*;
        use KeyCode::*;

        // === Global ===
        self.bind(Global, KeySpec::plain(Char('q')), Action::Quit);
        self.bind(Global, KeySpec::ctrl('c'), Action::Quit);
        self.bind(Global, KeySpec::plain(Char('j')), Action::NavDown);
        self.bind(Global, KeySpec::plain(Down), Action::NavDown);
        self.bind(Global, KeySpec::plain(Char('k')), Action::NavUp);
        self.bind(Global, KeySpec::plain(Up), Action::NavUp);
        self.bind(Global, KeySpec::plain(PageDown), Action::PageDown);
        self.bind(Global, KeySpec::ctrl('d'), Action::PageDown);
        self.bind(Global, KeySpec::plain(PageUp), Action::PageUp);
        self.bind(Global, KeySpec::ctrl('u'), Action::PageUp);
        self.bind(Global, KeySpec::plain(Char('?')), Action::ShowHelp);
        self.bind(Global, KeySpec::plain(Esc), Action::Back);

        // === News ===
        self.bind(News, KeySpec::plain(Enter), Action::Select);
        self.bind(News, KeySpec::plain(Char('o')), Action::Select);
        self.bind(News, KeySpec::plain(Char('a')), Action::ShowActions);
        self.bind(News, KeySpec::plain(Char('f')), Action::ToggleFavorite);
        self.bind(News, KeySpec::plain(Tab), Action::ToggleSegment);
        self.bind(News, KeySpec::plain(Char('r')), Action::Refresh);
        self.bind(News, KeySpec::plain(Char('n')), Action::NotificationSettings);
        self.bind(News, KeySpec::plain(Char('s')), Action::EditSources);

        // === Sources ===
        self.bind(Sources, KeySpec::plain(Char(' ')), Action::ToggleSource);
        self.bind(Sources, KeySpec::plain(Enter), Action::ConfirmSources);
        self.bind(Sources, KeySpec::plain(Char('r')), Action::Refresh);
        self.bind(Sources, KeySpec::plain(Char('c')), Action::FilterCategory);
        self.bind(Sources, KeySpec::plain(Char('l')), Action::FilterLanguage);
        self.bind(Sources, KeySpec::plain(Char('g')), Action::FilterCountry);

        // === Overlay ===
        self.bind(Overlay, KeySpec::plain(Enter), Action::Select);
        self.bind(Overlay, KeySpec::plain(Char('q')), Action::Back);
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_favorite").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Rebind in every context the action was bound in.
            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "select" | "open" => Some(Action::Select),
        "back" => Some(Action::Back),
        "refresh" | "reload" => Some(Action::Refresh),
        "show_help" | "help" => Some(Action::ShowHelp),
        "show_actions" | "actions" => Some(Action::ShowActions),
        "toggle_favorite" | "favorite" => Some(Action::ToggleFavorite),
        "toggle_segment" | "segment" => Some(Action::ToggleSegment),
        "notification_settings" | "notifications" => Some(Action::NotificationSettings),
        "edit_sources" | "sources" => Some(Action::EditSources),
        "toggle_source" => Some(Action::ToggleSource),
        "confirm_sources" | "done" => Some(Action::ConfirmSources),
        "filter_category" | "category" => Some(Action::FilterCategory),
        "filter_language" | "language" => Some(Action::FilterLanguage),
        "filter_country" | "country" => Some(Action::FilterCountry),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
