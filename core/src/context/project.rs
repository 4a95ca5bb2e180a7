//! Project type and language detection
//!
//! Precedence: a Node package manifest (dependency names mapped to a
//! framework), then a Go module marker, then a Rust manifest, then a
//! majority vote over file extensions. Extension-vote ties are broken
//! lexicographically on the language label so detection stays deterministic.

use super::DirEntry;
use std::collections::HashMap;
use std::path::Path;

/// Dependency name to framework label, checked in order
const FRAMEWORK_MAP: &[(&str, &str)] = &[
    ("next", "next.js"),
    ("react", "react"),
    ("vue", "vue"),
    ("@angular/core", "angular"),
    ("svelte", "svelte"),
    ("express", "express"),
];

/// File extension to language
const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("c", "c"),
    ("cpp", "c++"),
    ("go", "go"),
    ("java", "java"),
    ("js", "javascript"),
    ("kt", "kotlin"),
    ("php", "php"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("swift", "swift"),
    ("ts", "typescript"),
];

/// Detected project characteristics
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_type: String,
    pub framework: Option<String>,
    pub languages: Vec<String>,
}

impl ProjectInfo {
    fn unknown() -> Self {
        ProjectInfo {
            project_type: "unknown".to_string(),
            framework: None,
            languages: Vec::new(),
        }
    }
}

/// Detect the project type for `dir` given its listing. Fails soft: an
/// unreadable or unrecognizable directory yields `unknown`.
pub async fn detect(dir: &Path, entries: &[DirEntry]) -> ProjectInfo {
    if entries.iter().any(|e| e.name == "package.json") {
        return detect_node(dir, entries).await;
    }

    if entries.iter().any(|e| e.name == "go.mod") {
        return ProjectInfo {
            project_type: "go".to_string(),
            framework: None,
            languages: vec!["go".to_string()],
        };
    }

    if entries.iter().any(|e| e.name == "Cargo.toml") {
        return ProjectInfo {
            project_type: "rust".to_string(),
            framework: None,
            languages: vec!["rust".to_string()],
        };
    }

    detect_by_extension(entries)
}

async fn detect_node(dir: &Path, entries: &[DirEntry]) -> ProjectInfo {
    let mut languages = vec!["javascript".to_string()];
    let has_typescript = entries
        .iter()
        .any(|e| e.name == "tsconfig.json" || e.name.ends_with(".ts"));
    if has_typescript {
        languages.push("typescript".to_string());
    }

    let framework = match tokio::fs::read_to_string(dir.join("package.json")).await {
        Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(manifest) => find_framework(&manifest),
            Err(err) => {
                tracing::debug!("context: malformed package.json: {err}");
                None
            }
        },
        Err(_) => None,
    };

    ProjectInfo {
        project_type: "node".to_string(),
        framework,
        languages,
    }
}

fn find_framework(manifest: &serde_json::Value) -> Option<String> {
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = manifest.get(section).and_then(|v| v.as_object()) {
            for (name, label) in FRAMEWORK_MAP {
                if deps.contains_key(*name) {
                    return Some(label.to_string());
                }
            }
        }
    }
    None
}

fn detect_by_extension(entries: &[DirEntry]) -> ProjectInfo {
    let table: HashMap<&str, &str> = LANGUAGE_MAP.iter().copied().collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for entry in entries.iter().filter(|e| !e.is_directory) {
        if let Some(ext) = Path::new(&entry.name).extension().and_then(|e| e.to_str()) {
            if let Some(&language) = table.get(ext) {
                *counts.entry(language).or_default() += 1;
            }
        }
    }

    if counts.is_empty() {
        return ProjectInfo::unknown();
    }

    // Highest count first, lexicographic on language for equal counts
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    ProjectInfo {
        project_type: ranked[0].0.to_string(),
        framework: None,
        languages: ranked.iter().map(|(lang, _)| lang.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn file(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            is_directory: false,
            size: 1,
            modified_at: None,
        }
    }

    #[tokio::test]
    async fn test_node_project_with_framework() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"react": "^18.0.0", "lodash": "*"}}"#,
        )
        .unwrap();

        let entries = vec![file("package.json"), file("index.ts")];
        let info = detect(dir.path(), &entries).await;
        assert_eq!(info.project_type, "node");
        assert_eq!(info.framework.as_deref(), Some("react"));
        assert!(info.languages.contains(&"typescript".to_string()));
    }

    #[tokio::test]
    async fn test_manifest_markers_beat_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![file("go.mod"), file("script.py"), file("other.py")];
        let info = detect(dir.path(), &entries).await;
        assert_eq!(info.project_type, "go");
    }

    #[tokio::test]
    async fn test_extension_vote() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![file("a.py"), file("b.py"), file("c.rb")];
        let info = detect(dir.path(), &entries).await;
        assert_eq!(info.project_type, "python");
        assert_eq!(info.languages, vec!["python", "ruby"]);
    }

    #[tokio::test]
    async fn test_extension_tie_breaks_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![file("a.rb"), file("b.py")];
        let info = detect(dir.path(), &entries).await;
        assert_eq!(info.project_type, "python");
    }

    #[tokio::test]
    async fn test_unrecognized_directory_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![file("notes.txt")];
        let info = detect(dir.path(), &entries).await;
        assert_eq!(info.project_type, "unknown");
        assert!(info.languages.is_empty());
    }
}
