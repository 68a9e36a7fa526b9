use anyhow::Result;
use std::path::PathBuf;

/// Folder under the documents directory that holds the host's user data.
const DEFAULT_USER_DATA_FOLDER: &str = "Visual Studio 2008";
/// en-US, used when no locale can be derived from the environment.
const DEFAULT_LCID: u32 = 1033;

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Returns the host user-data root.
///
/// `SNIPDIRS_USER_DATA` wins; otherwise `<Documents>/Visual Studio 2008`,
/// falling back to the home directory when no documents folder is known.
pub fn user_data_root() -> Result<PathBuf> {
    if let Some(custom) = non_empty_var("SNIPDIRS_USER_DATA") {
        return Ok(PathBuf::from(custom));
    }
    let base = match dirs::document_dir() {
        Some(docs) => docs,
        None => home_dir()?.join("Documents"),
    };
    Ok(base.join(DEFAULT_USER_DATA_FOLDER))
}

/// User data root used when [`user_data_root`] cannot determine one.
///
/// Lives under the system temp directory, so it is always absolute.
pub fn fallback_user_data_root() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_USER_DATA_FOLDER)
}

/// Returns the UI locale override from `SNIPDIRS_LCID`, if set and numeric.
pub fn env_ui_locale() -> Option<u32> {
    std::env::var("SNIPDIRS_LCID")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Returns the LCID of the process locale.
///
/// Reads `LC_ALL`, `LC_MESSAGES` and `LANG` in that order and maps the
/// language/region prefix through a table of common locales.
pub fn current_locale() -> u32 {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| non_empty_var(key))
        .find_map(|tag| lcid_for_tag(&tag))
        .unwrap_or(DEFAULT_LCID)
}

/// Maps a POSIX locale tag such as `de_DE.UTF-8` to its Windows LCID.
pub fn lcid_for_tag(tag: &str) -> Option<u32> {
    let base = tag.split(['.', '@']).next().unwrap_or(tag);
    let normalized = base.replace('-', "_").to_ascii_lowercase();
    let lcid = match normalized.as_str() {
        "c" | "posix" | "en" | "en_us" => 1033,
        "en_gb" => 2057,
        "de" | "de_de" => 1031,
        "fr" | "fr_fr" => 1036,
        "es" | "es_es" => 3082,
        "it" | "it_it" => 1040,
        "ja" | "ja_jp" => 1041,
        "ko" | "ko_kr" => 1042,
        "ru" | "ru_ru" => 1049,
        "pt_br" => 1046,
        "zh_cn" => 2052,
        "zh_tw" => 1028,
        _ => return None,
    };
    Some(lcid)
}

/// Returns the host executable path from `SNIPDIRS_EXECUTABLE` or the running binary.
pub fn executable_path() -> Option<PathBuf> {
    if let Some(custom) = non_empty_var("SNIPDIRS_EXECUTABLE") {
        return Some(PathBuf::from(custom));
    }
    std::env::current_exe().ok()
}

/// Returns the host installation directory.
///
/// `SNIPDIRS_INSTALL_DIR` wins; otherwise the directory of [`executable_path`].
pub fn install_dir() -> Option<PathBuf> {
    if let Some(custom) = non_empty_var("SNIPDIRS_INSTALL_DIR") {
        return Some(PathBuf::from(custom));
    }
    executable_path().and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
}

/// Returns the configuration store file from `SNIPDIRS_STORE`.
pub fn store_file() -> Option<PathBuf> {
    non_empty_var("SNIPDIRS_STORE").map(PathBuf::from)
}

/// Returns the path to the settings file.
pub fn settings_file() -> Option<PathBuf> {
    if let Some(custom) = non_empty_var("SNIPDIRS_SETTINGS") {
        return Some(PathBuf::from(custom));
    }
    home_dir().ok().map(|h| h.join(".snipdirs/settings.json"))
}

/// Checks `SNIPDIRS_PATH_SEGMENT_MATCH`; `None` when unset.
pub fn env_path_segment_match() -> Option<bool> {
    std::env::var("SNIPDIRS_PATH_SEGMENT_MATCH")
        .ok()
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipdirs_test_utils::{env_guard, set_env_var};

    #[test]
    fn lcid_table_handles_encoding_suffixes() {
        assert_eq!(lcid_for_tag("de_DE.UTF-8"), Some(1031));
        assert_eq!(lcid_for_tag("ja-JP"), Some(1041));
        assert_eq!(lcid_for_tag("C"), Some(1033));
        assert_eq!(lcid_for_tag("sr_RS@latin"), None);
    }

    #[test]
    fn current_locale_prefers_lc_all() {
        let _g = env_guard();
        let _all = set_env_var("LC_ALL", Some("fr_FR.UTF-8"));
        let _lang = set_env_var("LANG", Some("de_DE.UTF-8"));
        assert_eq!(current_locale(), 1036);
    }

    #[test]
    fn current_locale_skips_unknown_tags() {
        let _g = env_guard();
        let _all = set_env_var("LC_ALL", Some("xx_YY"));
        let _msg = set_env_var("LC_MESSAGES", None);
        let _lang = set_env_var("LANG", Some("ko_KR.UTF-8"));
        assert_eq!(current_locale(), 1042);
    }

    #[test]
    fn current_locale_defaults_to_en_us() {
        let _g = env_guard();
        let _all = set_env_var("LC_ALL", None);
        let _msg = set_env_var("LC_MESSAGES", None);
        let _lang = set_env_var("LANG", None);
        assert_eq!(current_locale(), 1033);
    }

    #[test]
    fn ui_locale_ignores_garbage() {
        let _g = env_guard();
        let _v = set_env_var("SNIPDIRS_LCID", Some("not-a-number"));
        assert_eq!(env_ui_locale(), None);
        let _v = set_env_var("SNIPDIRS_LCID", Some(" 1041 "));
        assert_eq!(env_ui_locale(), Some(1041));
    }

    #[test]
    fn user_data_root_honors_override() {
        let _g = env_guard();
        let _v = set_env_var("SNIPDIRS_USER_DATA", Some("/srv/profile/vs"));
        assert_eq!(user_data_root().unwrap(), PathBuf::from("/srv/profile/vs"));
    }

    #[test]
    fn fallback_user_data_root_is_absolute() {
        let root = fallback_user_data_root();
        assert!(root.is_absolute());
        assert!(root.ends_with(DEFAULT_USER_DATA_FOLDER));
    }

    #[test]
    fn install_dir_defaults_to_executable_parent() {
        let _g = env_guard();
        let _exe = set_env_var("SNIPDIRS_EXECUTABLE", Some("/opt/ide/bin/ide"));
        let _dir = set_env_var("SNIPDIRS_INSTALL_DIR", None);
        assert_eq!(install_dir(), Some(PathBuf::from("/opt/ide/bin")));
    }

    #[test]
    fn path_segment_flag_parses_truthy_values() {
        let _g = env_guard();
        let _v = set_env_var("SNIPDIRS_PATH_SEGMENT_MATCH", Some("TRUE"));
        assert_eq!(env_path_segment_match(), Some(true));
        let _v = set_env_var("SNIPDIRS_PATH_SEGMENT_MATCH", Some("0"));
        assert_eq!(env_path_segment_match(), Some(false));
        let _v = set_env_var("SNIPDIRS_PATH_SEGMENT_MATCH", None);
        assert_eq!(env_path_segment_match(), None);
    }
}
