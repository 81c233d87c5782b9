//! Icon record.
//!
//! # Invariants
//! - `original_svg` is the pristine source; `svg` is always derived from it.
//! - `name` is unique among icons.

use crate::heal::Entity;
use crate::svg::{is_well_formed_svg, ColorMode};
use serde::{Deserialize, Serialize};

/// Recolorable SVG icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub id: String,
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub name: String,
    /// Currently rendered markup.
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub svg: String,
    /// Empty only for records written before recoloring existed.
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub original_svg: String,
    #[serde(default, deserialize_with = "crate::model::lenient::optional_text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "crate::model::lenient::color_mode")]
    pub color_mode: ColorMode,
}

impl Icon {
    pub fn new(id: impl Into<String>, name: impl Into<String>, svg: impl Into<String>) -> Self {
        let svg = svg.into();
        Self {
            id: id.into(),
            name: name.into(),
            original_svg: svg.clone(),
            svg,
            color: None,
            color_mode: ColorMode::Main,
        }
    }

    /// Copies `svg` into `original_svg` when an older record lacks it.
    ///
    /// Returns whether a backfill happened.
    pub fn backfill_original_svg(&mut self) -> bool {
        if self.original_svg.trim().is_empty() {
            self.original_svg = self.svg.clone();
            return true;
        }
        false
    }
}

/// Returns whether `icon` has an id, a name, and balanced svg tags.
pub fn is_valid_icon(icon: &Icon) -> bool {
    !icon.id.trim().is_empty() && !icon.name.trim().is_empty() && is_well_formed_svg(&icon.svg)
}

/// Drops every icon failing `is_valid_icon`.
pub fn clean_invalid_icons(icons: Vec<Icon>) -> Vec<Icon> {
    icons.into_iter().filter(is_valid_icon).collect()
}

impl Entity for Icon {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn is_well_formed(&self) -> bool {
        is_valid_icon(self)
    }
}
