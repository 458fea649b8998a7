//! Tree materialization: turns a template tree into a destination tree.
//!
//! A pass runs in two phases. [`Materializer::plan`] walks the source tree, consults the
//! inclusion policy, classifies entries, renames them and substitutes text content
//! without touching the destination. [`Materializer::apply`] then creates directories,
//! writes text files and copies binary files. Strict-mode token failures and a missing
//! source tree are reported before anything is written.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::classify::{is_safe_output_name, transform_name, EntryKind};
use crate::error::{Error, Result};
use crate::policy::InclusionPolicy;
use crate::tokens::{MissingTokens, TokenTable};

fn read_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::ReadError { path: path.to_path_buf(), source })?;
    String::from_utf8(bytes).map_err(|e| Error::EncodingError {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::WriteError { path: path.to_path_buf(), source })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(|source| Error::WriteError { path: path.to_path_buf(), source })
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        create_dir_all(parent)?;
    }
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|source| Error::WriteError { path: dest.to_path_buf(), source })
}

/// What the apply phase does for one planned entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    CreateDir,
    /// Write already-substituted text.
    Write { content: String },
    /// Copy the source bytes verbatim.
    Copy,
}

impl FileOperation {
    pub fn kind(&self) -> EntryKind {
        match self {
            FileOperation::CreateDir => EntryKind::Directory,
            FileOperation::Write { .. } => EntryKind::Text,
            FileOperation::Copy => EntryKind::Binary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannedEntry {
    /// Absolute path of the source entry.
    pub source: PathBuf,
    /// Transformed path relative to the destination root.
    pub target: PathBuf,
    pub operation: FileOperation,
}

/// Everything one pass will write, computed without side effects.
#[derive(Debug, Clone)]
pub struct Plan {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub entries: Vec<PlannedEntry>,
    /// Keys referenced by names or contents that have no value in the token table.
    pub unresolved: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Absolute destination path.
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Whether an existing file was replaced.
    pub overwritten: bool,
}

/// Record of every destination entry a pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn files(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.kind != EntryKind::Directory)
    }

    pub fn overwritten(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.overwritten)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    pub fn extend(&mut self, other: Manifest) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fails with [`Error::UnresolvedTokens`] when a strict pass left keys unresolved.
pub fn check_unresolved(missing: MissingTokens, unresolved: &BTreeSet<String>) -> Result<()> {
    if missing == MissingTokens::Strict && !unresolved.is_empty() {
        return Err(Error::UnresolvedTokens { keys: unresolved.iter().cloned().collect() });
    }
    Ok(())
}

/// The tree materialization engine.
///
/// Borrows its token table and policy for the whole pass; neither changes mid-walk.
pub struct Materializer<'a> {
    tokens: &'a TokenTable,
    policy: &'a InclusionPolicy,
    missing: MissingTokens,
}

impl<'a> Materializer<'a> {
    pub fn new(tokens: &'a TokenTable, policy: &'a InclusionPolicy) -> Self {
        Self { tokens, policy, missing: MissingTokens::default() }
    }

    pub fn with_missing_tokens(mut self, missing: MissingTokens) -> Self {
        self.missing = missing;
        self
    }

    pub fn missing_tokens(&self) -> MissingTokens {
        self.missing
    }

    /// Plans and applies one pass.
    ///
    /// # Errors
    /// * `Error::TemplateDoesNotExistsError` if `source_root` is not a directory
    /// * `Error::UnresolvedTokens` in strict mode, before any write
    /// * `Error::InvalidOutputName` if a renamed entry would escape its directory
    /// * `Error::EncodingError` if a text template is not UTF-8, before any write
    /// * I/O errors, which abort the pass and may leave a partial tree
    pub fn materialize<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        source_root: S,
        dest_root: D,
    ) -> Result<Manifest> {
        let plan = self.plan(source_root, dest_root)?;
        check_unresolved(self.missing, &plan.unresolved)?;
        Self::apply(plan)
    }

    /// Walks the source tree and computes every destination entry.
    pub fn plan<S: AsRef<Path>, D: AsRef<Path>>(&self, source_root: S, dest_root: D) -> Result<Plan> {
        let source_root = std::path::absolute(source_root.as_ref())?;
        if !source_root.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: source_root.display().to_string(),
            });
        }
        debug!("Planning template '{}'", source_root.display());

        let mut plan = Plan {
            source_root: source_root.clone(),
            dest_root: dest_root.as_ref().to_path_buf(),
            entries: Vec::new(),
            unresolved: BTreeSet::new(),
        };

        // The policy sees each entry once, before renaming; an excluded directory is
        // never descended into.
        let mut walker = WalkDir::new(&source_root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(&source_root).unwrap_or(entry.path());
                self.policy.includes(entry.path(), relative)
            });

        while let Some(entry) = walker.next() {
            let entry = entry?;
            let source = entry.path().to_path_buf();
            let relative = source
                .strip_prefix(&source_root)
                .map_err(|e| Error::TemplateError(e.to_string()))?;

            let file_type = entry.file_type();
            if file_type.is_symlink() && source.is_dir() {
                warn!("Not following directory link '{}'", source.display());
                continue;
            }

            let Some(target) = self.target_path(relative, &source, &mut plan.unresolved)? else {
                debug!("Skipping '{}' as its output name is empty", relative.display());
                if file_type.is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            };

            let operation = match EntryKind::classify(&entry.file_name().to_string_lossy(), file_type)
            {
                EntryKind::Directory => FileOperation::CreateDir,
                EntryKind::Text => {
                    let substituted = self.tokens.substitute(&read_file(&source)?, self.missing);
                    plan.unresolved.extend(substituted.unresolved);
                    FileOperation::Write { content: substituted.output }
                }
                EntryKind::Binary => FileOperation::Copy,
            };

            debug!("Planned '{}' -> '{}'", relative.display(), target.display());
            plan.entries.push(PlannedEntry { source, target, operation });
        }

        Ok(plan)
    }

    /// Transforms every component of a variant-relative path.
    ///
    /// Returns `None` when the last component renders to an empty name.
    fn target_path(
        &self,
        relative: &Path,
        source: &Path,
        unresolved: &mut BTreeSet<String>,
    ) -> Result<Option<PathBuf>> {
        let mut target = PathBuf::new();
        for component in relative.components() {
            let name = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| Error::TemplateError(format!("non UTF-8 path '{}'", source.display())))?;
            let output = transform_name(name, self.tokens, self.missing);
            unresolved.extend(output.unresolved);
            if output.name.is_empty() {
                return Ok(None);
            }
            if !is_safe_output_name(&output.name) {
                return Err(Error::InvalidOutputName {
                    name: output.name,
                    source_path: source.to_path_buf(),
                });
            }
            target.push(output.name);
        }
        Ok(Some(target))
    }

    /// Executes a plan against the file system.
    pub fn apply(plan: Plan) -> Result<Manifest> {
        create_dir_all(&plan.dest_root)?;

        let mut manifest = Manifest::default();
        for entry in plan.entries {
            let target = plan.dest_root.join(&entry.target);
            let overwritten = entry.operation != FileOperation::CreateDir && target.is_file();
            if overwritten {
                debug!("Overwriting existing file '{}'", target.display());
            }

            match &entry.operation {
                FileOperation::CreateDir => create_dir_all(&target)?,
                FileOperation::Write { content } => write_file(&target, content)?,
                FileOperation::Copy => copy_file(&entry.source, &target)?,
            }

            manifest.entries.push(ManifestEntry {
                path: target,
                kind: entry.operation.kind(),
                overwritten,
            });
        }
        Ok(manifest)
    }
}
