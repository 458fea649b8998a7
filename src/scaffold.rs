//! Create and add modes.
//!
//! Creating a solution materializes the base skeleton and then the chosen variant over
//! it with no restrictions. Adding a component materializes only the variant, with a
//! protective policy so files the solution has customized are never replaced.
//!
//! All passes of one invocation are planned before any of them is applied, so a strict
//! token failure in the second pass does not leave the first pass on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::constants::ROOT_OVERLAY_DIR;
use crate::error::Result;
use crate::locator::{root_overlay, variant_dest, ComponentKind, TemplateLibrary};
use crate::materialize::{check_unresolved, Manifest, Materializer};
use crate::policy::{ExclusionSet, InclusionPolicy};
use crate::solution::{ensure_gulp_tooling, is_existing_solution};
use crate::tokens::{MissingTokens, TokenTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate a new solution into an empty or non-solution directory.
    Create,
    /// Add a component to the solution already in the target directory.
    Add,
}

impl Mode {
    pub fn detect<P: AsRef<Path>>(target_dir: P) -> Self {
        if is_existing_solution(target_dir) {
            Mode::Add
        } else {
            Mode::Create
        }
    }
}

/// The component a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRequest {
    pub kind: ComponentKind,
    pub variant: String,
    pub name: String,
}

/// One source tree materialized onto one destination.
#[derive(Debug)]
struct Pass {
    source: PathBuf,
    dest: PathBuf,
    policy: InclusionPolicy,
}

pub struct Scaffolder<'a> {
    library: &'a TemplateLibrary,
    missing: MissingTokens,
}

impl<'a> Scaffolder<'a> {
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self { library, missing: MissingTokens::default() }
    }

    pub fn with_missing_tokens(mut self, missing: MissingTokens) -> Self {
        self.missing = missing;
        self
    }

    /// Generates a new solution named after the component into `target_dir`.
    pub fn scaffold_new_solution<P: AsRef<Path>>(
        &self,
        target_dir: P,
        request: &ComponentRequest,
        node_major: u32,
    ) -> Result<Manifest> {
        let target_dir = target_dir.as_ref();
        let tokens = TokenTable::for_solution(&request.name, node_major);

        let mut passes = vec![Pass {
            source: self.library.solution_template()?,
            dest: target_dir.to_path_buf(),
            policy: InclusionPolicy::Unrestricted,
        }];
        passes.extend(self.component_passes(target_dir, request, InclusionPolicy::Unrestricted)?);

        let manifest = self.run(&tokens, passes)?;

        if target_dir.join("package.json").is_file() {
            ensure_gulp_tooling(target_dir)?;
        } else {
            debug!("No package.json generated, skipping gulp tooling");
        }
        info!("Created solution '{}' in {}", request.name, target_dir.display());
        Ok(manifest)
    }

    /// Adds a component to the existing solution in `solution_dir`.
    ///
    /// `exclusions` are matched against variant-relative template paths; use
    /// [`ExclusionSet::protected`] for the standard rules.
    pub fn add_component<P: AsRef<Path>>(
        &self,
        solution_dir: P,
        request: &ComponentRequest,
        exclusions: ExclusionSet,
    ) -> Result<Manifest> {
        let solution_dir = solution_dir.as_ref();
        let tokens = TokenTable::for_component(&request.name);
        let passes =
            self.component_passes(solution_dir, request, InclusionPolicy::Protective(exclusions))?;

        let manifest = self.run(&tokens, passes)?;
        info!("Added {} '{}' to {}", request.kind, request.name, solution_dir.display());
        Ok(manifest)
    }

    /// Passes for the variant itself and its optional root overlay.
    fn component_passes(
        &self,
        solution_dir: &Path,
        request: &ComponentRequest,
        policy: InclusionPolicy,
    ) -> Result<Vec<Pass>> {
        let variant_root = self.library.component_template(request.kind, &request.variant)?;
        let dest = variant_dest(solution_dir, &variant_root, request.kind);

        let Some(overlay) = root_overlay(&variant_root) else {
            return Ok(vec![Pass { source: variant_root, dest, policy }]);
        };

        let variant_policy = match &policy {
            InclusionPolicy::Unrestricted => {
                InclusionPolicy::Protective(ExclusionSet::new().with_dir(ROOT_OVERLAY_DIR))
            }
            InclusionPolicy::Protective(set) => {
                InclusionPolicy::Protective(set.clone().with_dir(ROOT_OVERLAY_DIR))
            }
        };
        Ok(vec![
            Pass { source: variant_root, dest, policy: variant_policy },
            Pass { source: overlay, dest: solution_dir.to_path_buf(), policy },
        ])
    }

    fn run(&self, tokens: &TokenTable, passes: Vec<Pass>) -> Result<Manifest> {
        let mut plans = Vec::with_capacity(passes.len());
        for pass in &passes {
            let materializer = Materializer::new(tokens, &pass.policy).with_missing_tokens(self.missing);
            plans.push(materializer.plan(&pass.source, &pass.dest)?);
        }

        let unresolved: BTreeSet<String> =
            plans.iter().flat_map(|plan| plan.unresolved.iter().cloned()).collect();
        check_unresolved(self.missing, &unresolved)?;

        let mut manifest = Manifest::default();
        for plan in plans {
            manifest.extend(Materializer::apply(plan)?);
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn request(variant: &str) -> ComponentRequest {
        ComponentRequest {
            kind: ComponentKind::WebPart,
            variant: variant.to_string(),
            name: "hello-world".to_string(),
        }
    }

    #[test]
    fn test_mode_detect() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Mode::detect(dir.path()), Mode::Create);

        write(dir.path(), "package.json", r#"{"dependencies": {"@microsoft/sp-core-library": "1"}}"#);
        write(dir.path(), "config/package-solution.json", "{}");
        write(dir.path(), "gulpfile.js", "");
        assert_eq!(Mode::detect(dir.path()), Mode::Add);
    }

    #[test]
    fn test_component_rooted_variant_goes_under_mount_point() {
        let lib = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(lib.path(), "solution/README.md", "# {{SOLUTION_TITLE}}");
        write(lib.path(), "webpart/bare/{{COMPONENT_PASCAL}}/index.ts", "export {};");

        let library = TemplateLibrary::open(lib.path()).unwrap();
        Scaffolder::new(&library).scaffold_new_solution(out.path(), &request("bare"), 22).unwrap();

        assert_eq!(fs::read_to_string(out.path().join("README.md")).unwrap(), "# Hello World");
        assert!(out.path().join("src/webparts/HelloWorld/index.ts").is_file());
    }

    #[test]
    fn test_root_overlay_is_merged_into_solution_root() {
        let lib = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(lib.path(), "solution/README.md", "readme");
        write(lib.path(), "webpart/teams/{{COMPONENT_PASCAL}}/index.ts", "export {};");
        write(lib.path(), "webpart/teams/root-overlay/teams/manifest.json", r#"{"id": "{{COMPONENT_ID}}"}"#);

        let library = TemplateLibrary::open(lib.path()).unwrap();
        let manifest =
            Scaffolder::new(&library).scaffold_new_solution(out.path(), &request("teams"), 22).unwrap();

        assert!(out.path().join("teams/manifest.json").is_file());
        assert!(!out.path().join("src/webparts/root-overlay").exists());
        assert!(manifest.contains(&out.path().join("teams/manifest.json")));
    }

    #[test]
    fn test_strict_failure_in_later_pass_writes_nothing() {
        let lib = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(lib.path(), "solution/README.md", "{{SOLUTION_NAME}}");
        write(lib.path(), "webpart/minimal/src/webparts/a.ts", "{{NOT_A_TOKEN}}");
        let target = out.path().join("solution");

        let library = TemplateLibrary::open(lib.path()).unwrap();
        let result = Scaffolder::new(&library).scaffold_new_solution(&target, &request("minimal"), 22);

        assert!(result.is_err());
        assert!(!target.exists());
    }
}
