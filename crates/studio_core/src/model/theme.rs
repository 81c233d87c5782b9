//! Theme record.
//!
//! # Invariants
//! - `name` is non-blank and unique among themes.
//! - System themes cannot be deleted.

use crate::heal::Entity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Style-variable map in insertion order, e.g. `--h1-color -> #333333`.
pub type StyleMap = IndexMap<String, String>;

/// Named set of style-variable overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::model::lenient::flag")]
    pub is_system_theme: bool,
    #[serde(default, deserialize_with = "crate::model::lenient::style_map")]
    pub styles: StyleMap,
}

impl Theme {
    pub fn new(id: impl Into<String>, name: impl Into<String>, styles: StyleMap) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_system_theme: false,
            styles,
        }
    }
}

impl Entity for Theme {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
