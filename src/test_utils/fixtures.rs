use std::path::{Path, PathBuf};

use crate::providers::{Owner, Revision, SnippetBundle, SnippetFile};

/// Primary document of the [`weather_bundle`] fixture.
pub const WEATHER_SKILL: &str = "---
name: weather
description: Weather forecasts for any city
version: 1.0.0
tags: [weather, api]
author: nico
---
# Weather

Ask for the forecast and run `scripts/run.sh`.
";

/// Build a bundle owned by `owner` from `(storage key, content)` pairs.
#[must_use]
pub fn bundle(id: &str, owner: &str, files: &[(&str, &str)]) -> SnippetBundle {
    SnippetBundle {
        id: id.to_string(),
        description: format!("[gh-skill] {id}"),
        files: files
            .iter()
            .map(|(key, content)| {
                (
                    (*key).to_string(),
                    SnippetFile {
                        content: (*content).to_string(),
                        raw_url: format!("https://gist.githubusercontent.com/{owner}/{id}/raw/{key}"),
                    },
                )
            })
            .collect(),
        html_url: format!("https://gist.github.com/{owner}/{id}"),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-02T00:00:00Z".to_string(),
        owner: Owner {
            login: owner.to_string(),
        },
        history: vec![Revision {
            version: "rev-1".to_string(),
        }],
    }
}

/// A two-file skill by `nico`: a primary document and a nested script.
#[must_use]
pub fn weather_bundle() -> SnippetBundle {
    let mut weather = bundle(
        "weather01",
        "nico",
        &[
            ("weather.skill.md", WEATHER_SKILL),
            ("scripts--run.sh", "#!/bin/sh\necho hi"),
        ],
    );
    weather.description = "[gh-skill] Weather forecasts for any city".to_string();
    weather
}

/// Write a local skill directory `<root>/<name>` from relative paths.
pub fn write_skill_dir(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    for (relative, content) in files {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
    }
    dir
}
