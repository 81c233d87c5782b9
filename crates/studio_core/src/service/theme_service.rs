//! Theme use-case service.
//!
//! # Responsibility
//! - Own the theme collection, the active-theme pointer, and default styles.
//! - Push theme style variables onto a document `StyleScope`.
//! - Notify registered listeners when the active theme changes.
//!
//! # Invariants
//! - After `init`, at least one theme exists and the collection is repaired.
//! - Theme names are non-blank and unique; ids are unique.
//! - System themes are never deleted.
//! - `get_active_theme` returns `Some` whenever any theme exists.

use crate::heal::{repair_collection, repair_items, repair_pointer, PointerRepair};
use crate::model::generate_id;
use crate::model::theme::{StyleMap, Theme};
use crate::storage::{KeyValueStore, SaveOutcome, StorageAdapter, ACTIVE_THEME_KEY, THEMES_KEY};
use crate::style::StyleScope;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Id of the built-in theme seeded into an empty store.
pub const DEFAULT_THEME_ID: &str = "default";
/// Display name of the built-in theme.
pub const DEFAULT_THEME_NAME: &str = "Default";

const DEFAULT_STYLES: &[(&str, &str)] = &[
    ("--primary-color", "#07c160"),
    ("--body-bg", "#ffffff"),
    ("--body-color", "#333333"),
    ("--body-font-family", "-apple-system, BlinkMacSystemFont, \"PingFang SC\", sans-serif"),
    ("--body-font-size", "16px"),
    ("--body-line-height", "1.75"),
    ("--h1-color", "#1f2328"),
    ("--h1-font-size", "24px"),
    ("--h1-font-weight", "700"),
    ("--h1-text-align", "center"),
    ("--h1-border-bottom", "2px solid #07c160"),
    ("--h2-color", "#1f2328"),
    ("--h2-font-size", "20px"),
    ("--h2-font-weight", "700"),
    ("--h2-border-left", "4px solid #07c160"),
    ("--h3-color", "#1f2328"),
    ("--h3-font-size", "18px"),
    ("--h3-font-weight", "600"),
    ("--p-color", "#333333"),
    ("--p-font-size", "16px"),
    ("--p-line-height", "1.75"),
    ("--p-margin", "0 0 16px"),
    ("--p-text-indent", "0"),
    ("--blockquote-bg", "#f7f7f7"),
    ("--blockquote-border-color", "#07c160"),
    ("--blockquote-color", "#666666"),
    ("--code-bg", "#f6f8fa"),
    ("--code-color", "#d14"),
    ("--code-font-family", "Menlo, Consolas, monospace"),
    ("--link-color", "#576b95"),
    ("--strong-color", "#07c160"),
    ("--em-color", "#333333"),
    ("--hr-color", "#e5e5e5"),
    ("--list-marker-color", "#07c160"),
    ("--image-radius", "4px"),
    ("--table-border-color", "#dfe2e5"),
];

/// Returns the style set given to new themes.
pub fn default_styles() -> StyleMap {
    DEFAULT_STYLES
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Service error for theme use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// Name is empty after trim.
    EmptyName,
    /// Id is empty after trim.
    EmptyId,
    /// Another theme already uses this name.
    DuplicateName(String),
    /// System themes cannot be deleted.
    SystemThemeProtected(String),
    /// No theme has this id.
    ThemeNotFound(String),
}

impl Display for ThemeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "theme name must not be blank"),
            Self::EmptyId => write!(f, "theme id must not be blank"),
            Self::DuplicateName(name) => write!(f, "theme name already exists: `{name}`"),
            Self::SystemThemeProtected(id) => write!(f, "system theme cannot be deleted: {id}"),
            Self::ThemeNotFound(id) => write!(f, "theme not found: {id}"),
        }
    }
}

impl Error for ThemeError {}

/// Notification emitted when the active theme changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChangeEvent {
    /// The new active theme, `None` when no theme remains.
    pub active: Option<Theme>,
}

/// Handle returned by `ThemeService::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ThemeChangeEvent)>;

/// Theme service holding hydrated in-memory state.
pub struct ThemeService<S: KeyValueStore> {
    storage: StorageAdapter<S>,
    themes: Vec<Theme>,
    active_theme_id: Option<String>,
    /// Set when hydration dropped entries that still sit in storage.
    needs_persist: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> ThemeService<S> {
    /// Hydrates themes and the active pointer from storage.
    ///
    /// Call `init` before serving the UI.
    pub fn new(storage: StorageAdapter<S>) -> Self {
        let repaired = repair_collection::<Theme>(THEMES_KEY, storage.load_collection(THEMES_KEY));
        let active_theme_id = storage
            .load_raw(ACTIVE_THEME_KEY)
            .filter(|id| !id.trim().is_empty());
        Self {
            storage,
            needs_persist: repaired.changed(),
            themes: repaired.items,
            active_theme_id,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Seeds the default system theme into an empty store, then repairs the
    /// collection and the active pointer.
    pub fn init(&mut self) {
        if self.themes.is_empty() {
            let mut theme = Theme::new(DEFAULT_THEME_ID, DEFAULT_THEME_NAME, default_styles());
            theme.is_system_theme = true;
            self.themes.push(theme);
            self.needs_persist = true;
            self.write_active_pointer(Some(DEFAULT_THEME_ID.to_string()));
            info!("event=theme_seed module=theme status=ok theme_id={DEFAULT_THEME_ID}");
        }

        self.clean_invalid_themes();

        let ids = self.themes.iter().map(|theme| theme.id.as_str());
        let repair = repair_pointer(self.active_theme_id.as_deref(), ids);
        match repair {
            PointerRepair::Keep => {}
            PointerRepair::Repoint(id) => self.write_active_pointer(Some(id)),
            PointerRepair::Clear => self.write_active_pointer(None),
        }
    }

    /// Drops themes with blank id/name or duplicate ids and persists the
    /// result when anything changed. Returns the number dropped.
    pub fn clean_invalid_themes(&mut self) -> usize {
        let repaired = repair_items(std::mem::take(&mut self.themes));
        let dropped = repaired.dropped;
        self.themes = repaired.items;
        if dropped > 0 {
            warn!(
                "event=heal_collection module=theme status=repaired dropped={} kept={}",
                dropped,
                self.themes.len()
            );
        }
        if dropped > 0 || self.needs_persist {
            self.needs_persist = !self.persist().is_ok();
        }
        dropped
    }

    pub fn get_themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get_theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.id == id)
    }

    /// Creates a theme named `name` carrying the default style set.
    pub fn add_theme(&mut self, name: &str) -> Result<Theme, ThemeError> {
        self.create_theme(name, default_styles())
    }

    /// Creates a non-system copy of theme `id` named `name`.
    pub fn duplicate_theme(&mut self, id: &str, name: &str) -> Result<Theme, ThemeError> {
        let styles = self
            .get_theme(id)
            .map(|theme| theme.styles.clone())
            .ok_or_else(|| ThemeError::ThemeNotFound(id.to_string()))?;
        self.create_theme(name, styles)
    }

    /// Upserts `theme` by id; the updated theme moves to the end.
    ///
    /// A stored system theme keeps its system flag.
    pub fn update_theme(&mut self, theme: Theme) -> Result<(), ThemeError> {
        let mut theme = theme;
        theme.id = theme.id.trim().to_string();
        theme.name = theme.name.trim().to_string();
        if theme.id.is_empty() {
            return Err(ThemeError::EmptyId);
        }
        if theme.name.is_empty() {
            return Err(ThemeError::EmptyName);
        }
        if self
            .themes
            .iter()
            .any(|other| other.id != theme.id && other.name == theme.name)
        {
            return Err(ThemeError::DuplicateName(theme.name));
        }

        if let Some(position) = self.themes.iter().position(|other| other.id == theme.id) {
            let previous = self.themes.remove(position);
            theme.is_system_theme |= previous.is_system_theme;
        }
        info!("event=theme_update module=theme status=ok theme_id={}", theme.id);
        self.themes.push(theme);
        self.persist();
        Ok(())
    }

    /// Alias of `update_theme`.
    pub fn save_theme(&mut self, theme: Theme) -> Result<(), ThemeError> {
        self.update_theme(theme)
    }

    /// Restores the default style set on theme `id`.
    pub fn reset_theme_styles(&mut self, id: &str) -> Result<Theme, ThemeError> {
        let mut theme = self
            .get_theme(id)
            .cloned()
            .ok_or_else(|| ThemeError::ThemeNotFound(id.to_string()))?;
        theme.styles = default_styles();
        self.update_theme(theme.clone())?;
        Ok(theme)
    }

    /// Deletes theme `id`. Returns whether a theme was removed.
    ///
    /// Deleting the active theme moves the pointer to the first remaining
    /// theme (or clears it) and notifies listeners. An unknown id triggers a
    /// repair pass instead of an error.
    pub fn delete_theme(&mut self, id: &str) -> Result<bool, ThemeError> {
        let Some(position) = self.themes.iter().position(|theme| theme.id == id) else {
            warn!(
                "event=theme_delete module=theme status=not_found theme_id={} fallback=clean_invalid",
                id
            );
            self.clean_invalid_themes();
            return Ok(false);
        };
        if self.themes[position].is_system_theme {
            return Err(ThemeError::SystemThemeProtected(id.to_string()));
        }
        let was_active = self.get_active_theme().is_some_and(|theme| theme.id == id);

        self.themes.remove(position);
        self.persist();
        info!("event=theme_delete module=theme status=ok theme_id={}", id);

        if was_active {
            let next = self.themes.first().map(|theme| theme.id.clone());
            self.write_active_pointer(next);
            self.emit_change();
        }
        Ok(true)
    }

    /// Persists the active pointer, notifying listeners when it changed.
    pub fn set_active_theme(&mut self, id: &str) -> SaveOutcome {
        let changed = self.active_theme_id.as_deref() != Some(id);
        self.active_theme_id = Some(id.to_string());
        let outcome = self.storage.save_raw(ACTIVE_THEME_KEY, id);
        if changed {
            self.emit_change();
        }
        outcome
    }

    /// Returns the pointed-to theme, falling back to the first theme when
    /// the pointer is unset or dangling.
    pub fn get_active_theme(&self) -> Option<&Theme> {
        self.active_theme_id
            .as_deref()
            .and_then(|id| self.get_theme(id))
            .or_else(|| self.themes.first())
    }

    /// Returns the raw pointer value.
    pub fn active_theme_id(&self) -> Option<&str> {
        self.active_theme_id.as_deref()
    }

    /// Writes every style variable of theme `id` onto `scope` and makes it
    /// the active theme.
    pub fn apply_theme(
        &mut self,
        id: &str,
        scope: &mut dyn StyleScope,
    ) -> Result<Theme, ThemeError> {
        let theme = self
            .get_theme(id)
            .cloned()
            .ok_or_else(|| ThemeError::ThemeNotFound(id.to_string()))?;
        for (name, value) in &theme.styles {
            scope.set_property(name, value);
        }
        self.set_active_theme(id);
        info!(
            "event=theme_apply module=theme status=ok theme_id={} variables={}",
            id,
            theme.styles.len()
        );
        Ok(theme)
    }

    /// Registers `listener` for active-theme changes.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ThemeChangeEvent) + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn create_theme(&mut self, name: &str, styles: StyleMap) -> Result<Theme, ThemeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ThemeError::EmptyName);
        }
        if self.themes.iter().any(|theme| theme.name == name) {
            return Err(ThemeError::DuplicateName(name.to_string()));
        }

        let id = loop {
            let candidate = generate_id("theme");
            if self.get_theme(&candidate).is_none() {
                break candidate;
            }
        };
        let theme = Theme::new(id, name, styles);
        self.themes.push(theme.clone());
        self.persist();
        info!("event=theme_add module=theme status=ok theme_id={}", theme.id);
        Ok(theme)
    }

    fn write_active_pointer(&mut self, id: Option<String>) {
        match &id {
            Some(id) => {
                self.storage.save_raw(ACTIVE_THEME_KEY, id);
            }
            None => {
                self.storage.remove(ACTIVE_THEME_KEY);
            }
        }
        self.active_theme_id = id;
    }

    fn emit_change(&mut self) {
        let event = ThemeChangeEvent {
            active: self.get_active_theme().cloned(),
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn persist(&self) -> SaveOutcome {
        self.storage.save(THEMES_KEY, &self.themes)
    }
}
