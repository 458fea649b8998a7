//! Inspection and post-processing of generated solutions.

use std::fs;
use std::path::Path;

use log::debug;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const FRAMEWORK_PACKAGE_PREFIX: &str = "@microsoft/sp-";

const GULP_DEV_DEPENDENCIES: [(&str, &str); 2] = [("gulp", "^4.0.2"), ("gulp-cli", "^2.3.0")];

const GULP_SCRIPTS: [(&str, &str); 3] = [
    ("build", "gulp bundle"),
    ("serve", "gulp serve"),
    ("package", "gulp package-solution"),
];

/// Whether `dir` already holds a solution, in which case components are added to it
/// instead of generating a new one.
///
/// Requires a parseable `package.json` depending on a framework package, plus
/// `config/package-solution.json` and `gulpfile.js`.
pub fn is_existing_solution<P: AsRef<Path>>(dir: P) -> bool {
    let dir = dir.as_ref();
    let Ok(content) = fs::read_to_string(dir.join("package.json")) else {
        return false;
    };
    let Ok(manifest) = serde_json::from_str::<Value>(&content) else {
        debug!("Ignoring unparseable package.json in '{}'", dir.display());
        return false;
    };

    let depends_on_framework = ["dependencies", "devDependencies"].iter().any(|section| {
        manifest
            .get(section)
            .and_then(Value::as_object)
            .is_some_and(|deps| deps.keys().any(|name| name.starts_with(FRAMEWORK_PACKAGE_PREFIX)))
    });

    depends_on_framework
        && dir.join("config").join("package-solution.json").is_file()
        && dir.join("gulpfile.js").is_file()
}

/// Ensures the generated `package.json` carries the gulp toolchain and npm scripts for
/// the common gulp tasks. Existing entries are left untouched and key order is kept.
pub fn ensure_gulp_tooling<P: AsRef<Path>>(solution_dir: P) -> Result<()> {
    let path = solution_dir.as_ref().join("package.json");
    let content =
        fs::read_to_string(&path).map_err(|source| Error::ReadError { path: path.clone(), source })?;
    let mut manifest: Value = serde_json::from_str(&content)
        .map_err(|e| Error::ConfigError(format!("invalid '{}': {e}", path.display())))?;

    let root = manifest
        .as_object_mut()
        .ok_or_else(|| Error::ConfigError(format!("'{}' is not a JSON object", path.display())))?;
    insert_missing(root, "devDependencies", &GULP_DEV_DEPENDENCIES)?;
    insert_missing(root, "scripts", &GULP_SCRIPTS)?;

    let rendered = serde_json::to_string_pretty(&manifest)
        .map_err(|e| Error::ConfigError(e.to_string()))?;
    fs::write(&path, rendered).map_err(|source| Error::WriteError { path, source })
}

fn insert_missing(root: &mut Map<String, Value>, section: &str, entries: &[(&str, &str)]) -> Result<()> {
    let table = root
        .entry(section)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| Error::ConfigError(format!("'{section}' in package.json is not an object")))?;
    for (key, value) in entries {
        table.entry(*key).or_insert_with(|| Value::String(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn solution(dir: &Path, package_json: &str) {
        fs::create_dir_all(dir.join("config")).unwrap();
        fs::write(dir.join("package.json"), package_json).unwrap();
        fs::write(dir.join("config/package-solution.json"), "{}").unwrap();
        fs::write(dir.join("gulpfile.js"), "").unwrap();
    }

    #[test]
    fn test_detects_existing_solution() {
        let dir = TempDir::new().unwrap();
        solution(dir.path(), r#"{"dependencies": {"@microsoft/sp-core-library": "1.21.1"}}"#);
        assert!(is_existing_solution(dir.path()));
    }

    #[test]
    fn test_dev_dependency_counts() {
        let dir = TempDir::new().unwrap();
        solution(dir.path(), r#"{"devDependencies": {"@microsoft/sp-build-web": "1.21.1"}}"#);
        assert!(is_existing_solution(dir.path()));
    }

    #[test]
    fn test_rejects_incomplete_solutions() {
        let empty = TempDir::new().unwrap();
        assert!(!is_existing_solution(empty.path()));

        let plain = TempDir::new().unwrap();
        solution(plain.path(), r#"{"dependencies": {"react": "18.0.0"}}"#);
        assert!(!is_existing_solution(plain.path()));

        let broken = TempDir::new().unwrap();
        solution(broken.path(), "{not json");
        assert!(!is_existing_solution(broken.path()));

        let no_gulp = TempDir::new().unwrap();
        solution(no_gulp.path(), r#"{"dependencies": {"@microsoft/sp-core-library": "1"}}"#);
        fs::remove_file(no_gulp.path().join("gulpfile.js")).unwrap();
        assert!(!is_existing_solution(no_gulp.path()));
    }

    #[test]
    fn test_ensure_gulp_tooling_keeps_existing_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "demo", "scripts": {"build": "custom"}, "devDependencies": {"gulp": "^5.0.0"}}"#,
        )
        .unwrap();

        ensure_gulp_tooling(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
        let manifest: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(manifest["scripts"]["build"], json!("custom"));
        assert_eq!(manifest["scripts"]["serve"], json!("gulp serve"));
        assert_eq!(manifest["devDependencies"]["gulp"], json!("^5.0.0"));
        assert_eq!(manifest["devDependencies"]["gulp-cli"], json!("^2.3.0"));

        let keys: Vec<&String> = manifest.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "scripts", "devDependencies"]);
    }

    #[test]
    fn test_ensure_gulp_tooling_requires_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(ensure_gulp_tooling(dir.path()), Err(Error::ReadError { .. })));
    }
}
