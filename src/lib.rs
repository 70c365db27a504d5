//! Core entry point for the servicedesk_docs crate.

pub mod bookmarks;
pub mod builder;
pub mod config;
pub mod content;
pub mod encoding;
pub mod fonts;
pub mod inspect;
pub mod model;
