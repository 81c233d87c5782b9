//! Icon use-case service.
//!
//! # Responsibility
//! - Own the icon collection, seeding built-in icons on first use.
//! - Recolor icons from their pristine source markup.
//!
//! # Invariants
//! - Recoloring always derives `svg` from `original_svg`.
//! - Icon names are unique; stored svg markup has balanced svg tags.

use crate::heal::repair_collection;
use crate::model::generate_id;
use crate::model::icon::Icon;
use crate::storage::{KeyValueStore, SaveOutcome, StorageAdapter, ICONS_KEY};
use crate::svg::{apply_color_to_svg, is_well_formed_svg, ColorMode, SvgError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BUILTIN_ICONS: &[(&str, &str, &str)] = &[
    (
        "builtin_star",
        "star",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor"><polygon points="12 2 15.09 8.26 22 9.27 17 14.14 18.18 21.02 12 17.77 5.82 21.02 7 14.14 2 9.27 8.91 8.26 12 2"/></svg>"#,
    ),
    (
        "builtin_heart",
        "heart",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor"><path d="M12 21.35l-1.45-1.32C5.4 15.36 2 12.28 2 8.5 2 5.42 4.42 3 7.5 3c1.74 0 3.41.81 4.5 2.09C13.09 3.81 14.76 3 16.5 3 19.58 3 22 5.42 22 8.5c0 3.78-3.4 6.86-8.55 11.54L12 21.35z"/></svg>"#,
    ),
    (
        "builtin_check",
        "check",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none"><polyline points="20 6 9 17 4 12" stroke="black" stroke-width="2" stroke-linecap="round"/></svg>"#,
    ),
    (
        "builtin_dot",
        "dot",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle cx="12" cy="12" r="6"/></svg>"#,
    ),
];

/// Service error for icon use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconError {
    EmptyName,
    EmptySvg,
    /// Markup lacks an opening or closing svg tag.
    MalformedSvg,
    DuplicateName(String),
    IconNotFound(String),
    /// Recoloring failed.
    Svg(SvgError),
}

impl Display for IconError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "icon name must not be blank"),
            Self::EmptySvg => write!(f, "icon svg must not be blank"),
            Self::MalformedSvg => write!(f, "icon svg must contain <svg> and </svg> tags"),
            Self::DuplicateName(name) => write!(f, "icon name already exists: `{name}`"),
            Self::IconNotFound(id) => write!(f, "icon not found: {id}"),
            Self::Svg(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IconError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Svg(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SvgError> for IconError {
    fn from(value: SvgError) -> Self {
        Self::Svg(value)
    }
}

/// Field patch for `IconService::update_icon`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconUpdate {
    pub name: Option<String>,
    /// Replaces both `svg` and `original_svg`.
    pub svg: Option<String>,
    /// Triggers a recolor from `original_svg`.
    pub color: Option<String>,
    pub color_mode: Option<ColorMode>,
}

/// Icon service over an injected storage adapter.
pub struct IconService<S: KeyValueStore> {
    storage: StorageAdapter<S>,
}

impl<S: KeyValueStore> IconService<S> {
    pub fn new(storage: StorageAdapter<S>) -> Self {
        Self { storage }
    }

    pub fn get_icons(&self) -> Vec<Icon> {
        self.load_icons()
    }

    pub fn get_icon(&self, id: &str) -> Option<Icon> {
        self.load_icons().into_iter().find(|icon| icon.id == id)
    }

    /// Adds an uncolored icon. `svg` becomes both current and original markup.
    pub fn add_icon(&self, name: &str, svg: &str) -> Result<Icon, IconError> {
        let name = name.trim();
        let svg = svg.trim();
        validate_name(name)?;
        validate_svg(svg)?;

        let mut icons = self.load_icons();
        if icons.iter().any(|icon| icon.name == name) {
            return Err(IconError::DuplicateName(name.to_string()));
        }

        let icon = Icon::new(generate_id("icon"), name, svg);
        icons.push(icon.clone());
        self.persist(&icons);
        info!("event=icon_add module=icon status=ok icon_id={}", icon.id);
        Ok(icon)
    }

    /// Removes icon `id`. Returns whether an icon was removed.
    pub fn delete_icon(&self, id: &str) -> bool {
        let mut icons = self.load_icons();
        let before = icons.len();
        icons.retain(|icon| icon.id != id);
        if icons.len() == before {
            return false;
        }
        self.persist(&icons);
        info!("event=icon_delete module=icon status=ok icon_id={}", id);
        true
    }

    /// Applies `update` to icon `id`.
    ///
    /// Whenever the patched icon carries a color, `svg` is re-derived from
    /// `original_svg` rather than patched as a bare field.
    pub fn update_icon(&self, id: &str, update: IconUpdate) -> Result<Icon, IconError> {
        let mut icons = self.load_icons();
        let position = icons
            .iter()
            .position(|icon| icon.id == id)
            .ok_or_else(|| IconError::IconNotFound(id.to_string()))?;

        let mut icon = icons[position].clone();
        if let Some(name) = update.name {
            let name = name.trim().to_string();
            validate_name(&name)?;
            if icons.iter().any(|other| other.id != id && other.name == name) {
                return Err(IconError::DuplicateName(name));
            }
            icon.name = name;
        }
        if let Some(svg) = update.svg {
            let svg = svg.trim().to_string();
            validate_svg(&svg)?;
            icon.original_svg = svg.clone();
            icon.svg = svg;
        }
        icon.backfill_original_svg();

        if let Some(color) = update.color {
            icon.color = Some(color);
        }
        icon.color_mode = update.color_mode.unwrap_or(icon.color_mode);
        if let Some(color) = icon.color.clone() {
            icon.svg = apply_color_to_svg(&icon.original_svg, &color, icon.color_mode)?;
        }

        icons[position] = icon.clone();
        self.persist(&icons);
        info!(
            "event=icon_update module=icon status=ok icon_id={} color={} mode={}",
            id,
            icon.color.as_deref().unwrap_or("none"),
            icon.color_mode
        );
        Ok(icon)
    }

    /// Recolors icon `id`, backfilling `original_svg` on older records first.
    pub fn update_icon_color(
        &self,
        id: &str,
        color: &str,
        mode: ColorMode,
    ) -> Result<Icon, IconError> {
        self.update_icon(
            id,
            IconUpdate {
                color: Some(color.to_string()),
                color_mode: Some(mode),
                ..IconUpdate::default()
            },
        )
    }

    /// Restores `svg` from `original_svg` and clears the color.
    pub fn reset_icon_color(&self, id: &str) -> Result<Icon, IconError> {
        let mut icons = self.load_icons();
        let icon = icons
            .iter_mut()
            .find(|icon| icon.id == id)
            .ok_or_else(|| IconError::IconNotFound(id.to_string()))?;
        icon.backfill_original_svg();
        icon.svg = icon.original_svg.clone();
        icon.color = None;
        let reset = icon.clone();
        self.persist(&icons);
        Ok(reset)
    }

    fn load_icons(&self) -> Vec<Icon> {
        if !self.storage.contains(ICONS_KEY) {
            let seeded = builtin_icons();
            self.persist(&seeded);
            info!(
                "event=icon_seed module=icon status=ok count={}",
                seeded.len()
            );
            return seeded;
        }

        let repaired = repair_collection::<Icon>(ICONS_KEY, self.storage.load_collection(ICONS_KEY));
        if repaired.changed() {
            self.persist(&repaired.items);
        }
        repaired.items
    }

    fn persist(&self, icons: &[Icon]) -> SaveOutcome {
        self.storage.save(ICONS_KEY, icons)
    }
}

/// Returns the icons seeded into an empty store.
pub fn builtin_icons() -> Vec<Icon> {
    BUILTIN_ICONS
        .iter()
        .map(|(id, name, svg)| Icon::new(*id, *name, *svg))
        .collect()
}

fn validate_name(name: &str) -> Result<(), IconError> {
    if name.is_empty() {
        return Err(IconError::EmptyName);
    }
    Ok(())
}

fn validate_svg(svg: &str) -> Result<(), IconError> {
    if svg.is_empty() {
        return Err(IconError::EmptySvg);
    }
    if !is_well_formed_svg(svg) {
        return Err(IconError::MalformedSvg);
    }
    Ok(())
}
