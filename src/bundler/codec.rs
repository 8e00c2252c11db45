//! Storage key codec.
//!
//! Snippet backends store a flat map of filenames, so a skill's directory tree
//! is encoded by replacing every path separator with [`KEY_SEPARATOR`]:
//! `scripts/setup.sh` is stored as `scripts--setup.sh`.
//!
//! The encoding is not injective: a component that already contains `--`
//! (`refs/a--b.md`) expands to an extra directory level (`refs/a/b.md`).

use std::path::MAIN_SEPARATOR_STR;

/// Marker standing in for a path separator inside a storage key.
pub const KEY_SEPARATOR: &str = "--";

/// Encode a relative path as a flat storage key.
#[must_use]
pub fn flatten(path: &str) -> String {
    path.replace(MAIN_SEPARATOR_STR, KEY_SEPARATOR)
}

/// Decode a storage key back into a relative path.
#[must_use]
pub fn expand(key: &str) -> String {
    key.replace(KEY_SEPARATOR, MAIN_SEPARATOR_STR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestCase, run_table_tests};
    use proptest::prelude::*;

    #[test]
    fn expand_cases() -> Result<(), String> {
        let cases = vec![
            TestCase {
                name: "top-level file",
                input: "SKILL.md",
                expected: "SKILL.md".to_string(),
                should_panic: false,
            },
            TestCase {
                name: "one directory",
                input: "scripts--setup.sh",
                expected: "scripts/setup.sh".to_string(),
                should_panic: false,
            },
            TestCase {
                name: "nested directories",
                input: "references--api--docs.md",
                expected: "references/api/docs.md".to_string(),
                should_panic: false,
            },
            TestCase {
                name: "single dash untouched",
                input: "run-me.sh",
                expected: "run-me.sh".to_string(),
                should_panic: false,
            },
        ];
        run_table_tests(cases, expand)
    }

    #[test]
    fn flatten_cases() -> Result<(), String> {
        let cases = vec![
            TestCase {
                name: "top-level file",
                input: "SKILL.md",
                expected: "SKILL.md".to_string(),
                should_panic: false,
            },
            TestCase {
                name: "one directory",
                input: "scripts/setup.sh",
                expected: "scripts--setup.sh".to_string(),
                should_panic: false,
            },
            TestCase {
                name: "nested directories",
                input: "a/b/c.txt",
                expected: "a--b--c.txt".to_string(),
                should_panic: false,
            },
        ];
        run_table_tests(cases, flatten)
    }

    #[test]
    fn marker_inside_component_collides() {
        let key = flatten("refs/a--b.md");
        assert_eq!(key, "refs--a--b.md");
        assert_eq!(expand(&key), "refs/a/b.md");
    }

    proptest! {
        #[test]
        fn expand_inverts_flatten(
            components in prop::collection::vec("[A-Za-z0-9_.][A-Za-z0-9_. ]{0,11}", 1..5)
        ) {
            // Components never contain the marker (no dashes at all here).
            let path = components.join(MAIN_SEPARATOR_STR);
            let key = flatten(&path);
            prop_assert!(!key.contains(MAIN_SEPARATOR_STR));
            prop_assert_eq!(expand(&key), path);
        }
    }
}
