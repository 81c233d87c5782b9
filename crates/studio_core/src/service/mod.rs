//! Core use-case services.
//!
//! # Responsibility
//! - Own one collection (and pointer) each, persisted through `StorageAdapter`.
//! - Keep UI collaborators decoupled from storage details.
//!
//! # Invariants
//! - Services never call each other; the only outward signal is the theme
//!   change notification.

pub mod autosave;
pub mod draft_service;
pub mod icon_service;
pub mod publish_service;
pub mod theme_service;
