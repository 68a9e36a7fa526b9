//! Configuration for snippet directory resolution.
//!
//! This crate provides utilities for:
//! - Reading host facts (user data root, locale, executable) from the environment.
//! - Loading resolver settings from `~/.snipdirs/settings.json`.

pub mod env;
pub mod settings;

pub use env::{
    current_locale, env_path_segment_match, env_ui_locale, executable_path,
    fallback_user_data_root, home_dir, install_dir, lcid_for_tag, settings_file, store_file,
    user_data_root,
};
pub use settings::{
    load_settings, load_settings_from, ResolverSettings, DEFAULT_EXPANSIONS_SECTION,
    PATH_SEGMENT_RULE, SUBSTRING_RULE,
};
