//! Primary document recognition.
//!
//! A bundle names its skill document `<name>.skill.md`; older bundles used a
//! bare `SKILL.md`. On disk the document is always called `SKILL.md`.

use std::collections::BTreeMap;

use crate::providers::SnippetFile;

/// Reserved suffix of a bundle's skill document (matched case-insensitively).
pub const SKILL_SUFFIX: &str = ".skill.md";

/// Filename of the skill document on disk, and the legacy bundle filename.
pub const SKILL_FILE: &str = "SKILL.md";

/// Whether a storage key names a `<name>.skill.md` document.
#[must_use]
pub fn is_skill_file(key: &str) -> bool {
    key.len()
        .checked_sub(SKILL_SUFFIX.len())
        .filter(|&split| key.is_char_boundary(split))
        .is_some_and(|split| key[split..].eq_ignore_ascii_case(SKILL_SUFFIX))
}

/// Storage key for a skill document named `name`.
#[must_use]
pub fn skill_file_name(name: &str) -> String {
    format!("{name}{SKILL_SUFFIX}")
}

/// Skill name encoded in a `<name>.skill.md` key, if any.
#[must_use]
pub fn skill_name_from_file(key: &str) -> Option<&str> {
    if !is_skill_file(key) {
        return None;
    }
    let name = &key[..key.len() - SKILL_SUFFIX.len()];
    (!name.is_empty()).then_some(name)
}

/// Locate the primary document in a bundle's file map.
///
/// Suffix matches win over the legacy `SKILL.md`. With several suffix matches
/// the first key in map order is chosen.
#[must_use]
pub fn find_primary(files: &BTreeMap<String, SnippetFile>) -> Option<(&str, &SnippetFile)> {
    files
        .iter()
        .find(|(key, _)| is_skill_file(key))
        .or_else(|| files.get_key_value(SKILL_FILE))
        .map(|(key, file)| (key.as_str(), file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(keys: &[&str]) -> BTreeMap<String, SnippetFile> {
        keys.iter()
            .map(|key| {
                (
                    (*key).to_string(),
                    SnippetFile {
                        content: format!("content of {key}"),
                        raw_url: String::new(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        assert!(is_skill_file("weather.skill.md"));
        assert!(is_skill_file("WEATHER.SKILL.MD"));
        assert!(is_skill_file("Weather.Skill.Md"));
        assert!(!is_skill_file("README.md"));
        assert!(!is_skill_file("SKILL.md"));
    }

    #[test]
    fn name_from_file_keeps_original_case() {
        assert_eq!(skill_name_from_file("Weather.SKILL.md"), Some("Weather"));
        assert_eq!(skill_name_from_file("SKILL.md"), None);
        assert_eq!(skill_name_from_file(".skill.md"), None);
    }

    #[test]
    fn prefers_suffix_over_legacy() {
        let map = files(&["SKILL.md", "weather.SKILL.MD", "scripts--run.sh"]);
        let (key, file) = find_primary(&map).unwrap();
        assert_eq!(key, "weather.SKILL.MD");
        assert_eq!(file.content, "content of weather.SKILL.MD");
    }

    #[test]
    fn falls_back_to_legacy() {
        let map = files(&["SKILL.md", "notes.md"]);
        assert_eq!(find_primary(&map).unwrap().0, "SKILL.md");
    }

    #[test]
    fn legacy_match_is_exact() {
        let map = files(&["skill.md", "notes.md"]);
        assert!(find_primary(&map).is_none());
    }

    #[test]
    fn skill_file_name_round_trips() {
        let key = skill_file_name("weather");
        assert_eq!(key, "weather.skill.md");
        assert_eq!(skill_name_from_file(&key), Some("weather"));
    }
}
