//! gistskill - install, share and trust agent skills stored as gists and snippets.
//!
//! A skill is a directory with a `SKILL.md` document. Remote backends only
//! store flat file maps, so directories are flattened on publish and expanded
//! again on install. Installed skills live in a local registry and are linked
//! into the skill directories of AI coding tools.

pub mod app;
pub mod bundler;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod linking;
pub mod providers;
pub mod test_utils;
pub mod utils;

pub use error::{Result, SkillError};
