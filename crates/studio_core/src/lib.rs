//! Content-and-style core of the article studio.
//!
//! This crate owns drafts, themes, icons, and published articles inside a
//! key-value store, and is the single source of truth for their invariants.

pub mod config;
pub mod db;
pub mod heal;
pub mod logging;
pub mod markup;
pub mod model;
pub mod service;
pub mod storage;
pub mod style;
pub mod svg;

pub use config::{ConfigError, StudioConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use markup::{extract_title, plain_text, EMPTY_PARAGRAPH, UNTITLED_DRAFT};
pub use model::draft::Draft;
pub use model::icon::{clean_invalid_icons, is_valid_icon, Icon};
pub use model::published::PublishedArticle;
pub use model::theme::{StyleMap, Theme};
pub use service::autosave::{AutoSaver, DEFAULT_AUTOSAVE_DELAY};
pub use service::draft_service::{DraftError, DraftService};
pub use service::icon_service::{IconError, IconService, IconUpdate};
pub use service::publish_service::PublishService;
pub use service::theme_service::{
    default_styles, SubscriptionId, ThemeChangeEvent, ThemeError, ThemeService,
};
pub use storage::{KeyValueStore, MemoryStore, SaveOutcome, SqliteStore, StorageAdapter, StorageError};
pub use style::{InMemoryStyleScope, StyleScope};
pub use svg::{analyze_svg_structure, apply_color_to_svg, ColorMode, SvgElementInfo, SvgError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
