//! Inclusion policies deciding which template entries take part in a pass.
//!
//! Rules are written against the template's literal, variant-relative path shape and
//! are evaluated before any name transformation, so they never depend on token values.

use std::collections::BTreeSet;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

use crate::error::Result;

/// Files an existing solution has almost certainly customized.
pub const PROTECTED_PATHS: [&str; 5] = [
    "package.json",
    "gulpfile.js",
    "tsconfig.json",
    "config/package-solution.json",
    "config/write-manifests.json",
];

/// Directories skipped wholesale when adding a component.
pub const PROTECTED_DIRS: [&str; 1] = [".vscode"];

/// Strategy consulted once per source entry.
#[derive(Debug, Clone, Default)]
pub enum InclusionPolicy {
    /// Every entry is included. Used when creating a new solution.
    #[default]
    Unrestricted,
    /// Entries matching the exclusion set are skipped. Used when adding to a solution.
    Protective(ExclusionSet),
}

impl InclusionPolicy {
    /// The policy used when adding a component to an existing solution.
    pub fn protective() -> Self {
        InclusionPolicy::Protective(ExclusionSet::protected())
    }

    /// Decides whether an entry participates in the pass.
    ///
    /// # Arguments
    /// * `abs_source` - Absolute path of the entry inside the template library
    /// * `relative` - Path of the entry relative to the variant root
    pub fn includes(&self, abs_source: &Path, relative: &Path) -> bool {
        match self {
            InclusionPolicy::Unrestricted => true,
            InclusionPolicy::Protective(set) => {
                let excluded = set.excludes(relative);
                if excluded {
                    debug!("Skipping protected path: {}", abs_source.display());
                }
                !excluded
            }
        }
    }
}

/// Enumerable set of exclusion rules.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    paths: BTreeSet<String>,
    dirs: BTreeSet<String>,
    patterns: Vec<String>,
    globs: GlobSet,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self {
            paths: BTreeSet::new(),
            dirs: BTreeSet::new(),
            patterns: Vec::new(),
            globs: GlobSet::empty(),
        }
    }
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default add-mode rules: [`PROTECTED_PATHS`] and [`PROTECTED_DIRS`].
    pub fn protected() -> Self {
        let set = PROTECTED_PATHS.iter().fold(Self::new(), |set, path| set.with_path(path));
        PROTECTED_DIRS.iter().fold(set, |set, dir| set.with_dir(dir))
    }

    /// Excludes exactly this variant-relative path.
    pub fn with_path(mut self, path: &str) -> Self {
        self.paths.insert(normalize_str(path));
        self
    }

    /// Excludes a directory and everything beneath it.
    pub fn with_dir(mut self, dir: &str) -> Self {
        self.dirs.insert(normalize_str(dir).trim_end_matches('/').to_string());
        self
    }

    /// Excludes every path matching one of the glob patterns.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.patterns.iter().map(String::as_str).chain(patterns.iter().map(S::as_ref)) {
            builder.add(Glob::new(pattern)?);
        }
        self.globs = builder.build()?;
        self.patterns.extend(patterns.iter().map(|p| p.as_ref().to_string()));
        Ok(self)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Whether a variant-relative path is excluded.
    pub fn excludes(&self, relative: &Path) -> bool {
        let rel = normalize(relative);
        if self.paths.contains(&rel) {
            return true;
        }
        if self
            .dirs
            .iter()
            .any(|dir| rel == *dir || rel.strip_prefix(dir.as_str()).is_some_and(|r| r.starts_with('/')))
        {
            return true;
        }
        self.globs.is_match(&rel)
    }
}

fn normalize(path: &Path) -> String {
    let parts: Vec<_> = path.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    parts.join("/")
}

fn normalize_str(path: &str) -> String {
    normalize(Path::new(&path.replace('\\', "/")))
}
