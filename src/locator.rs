//! Template library layout: where variants live and where components are mounted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;

use crate::config::{LibraryConfig, VariantChoice};
use crate::constants::{ROOT_OVERLAY_DIR, SOLUTION_TEMPLATE_DIR};
use crate::error::{Error, Result};

/// Kind of client-side component a variant produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    WebPart,
    Extension,
    Library,
    AdaptiveCardExtension,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::WebPart,
        ComponentKind::Library,
        ComponentKind::Extension,
        ComponentKind::AdaptiveCardExtension,
    ];

    /// Directory name of this kind inside the template library.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ComponentKind::WebPart => "webpart",
            ComponentKind::Extension => "extension",
            ComponentKind::Library => "library",
            ComponentKind::AdaptiveCardExtension => "adaptive-card-extension",
        }
    }

    /// Solution-relative directory components of this kind are mounted under.
    pub fn mount_point(&self) -> &'static str {
        match self {
            ComponentKind::WebPart => "src/webparts",
            ComponentKind::Extension => "src/extensions",
            ComponentKind::Library => "src/libraries",
            ComponentKind::AdaptiveCardExtension => "src/adaptiveCardExtensions",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ComponentKind::WebPart => "Web part",
            ComponentKind::Extension => "Extension",
            ComponentKind::Library => "Library",
            ComponentKind::AdaptiveCardExtension => "Adaptive Card Extension",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ComponentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "webpart" | "web-part" => Ok(ComponentKind::WebPart),
            "extension" => Ok(ComponentKind::Extension),
            "library" => Ok(ComponentKind::Library),
            "adaptive-card-extension" | "ace" => Ok(ComponentKind::AdaptiveCardExtension),
            other => Err(Error::ConfigError(format!("unknown component type '{other}'"))),
        }
    }
}

/// A directory of templates: `solution/` plus `<kind>/<variant>/` trees.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    root: PathBuf,
    config: LibraryConfig,
}

impl TemplateLibrary {
    /// Opens a library rooted at `root`, loading its optional configuration file.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::TemplateDoesNotExistsError { template_dir: root.display().to_string() });
        }
        let config = LibraryConfig::load(&root)?;
        Ok(Self { root, config })
    }

    /// Finds the library: `explicit` if given, otherwise `templates/` beside the
    /// executable or one or two levels above it.
    pub fn discover(explicit: Option<&Path>, exe_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Self::open(dir);
        }

        let candidates: Vec<PathBuf> = exe_dir
            .map(|dir| {
                dir.ancestors().take(3).map(|ancestor| ancestor.join("templates")).collect()
            })
            .unwrap_or_default();

        for candidate in &candidates {
            if candidate.join(SOLUTION_TEMPLATE_DIR).is_dir() {
                debug!("Using template library '{}'", candidate.display());
                return Self::open(candidate);
            }
        }

        let tried: Vec<String> = candidates.iter().map(|c| format!("  {}", c.display())).collect();
        Err(Error::TemplateError(format!("templates not found, tried:\n{}", tried.join("\n"))))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Variant choices offered for `kind`.
    pub fn variants(&self, kind: ComponentKind) -> Vec<VariantChoice> {
        self.config.variants(kind)
    }

    /// Base skeleton every new solution starts from.
    pub fn solution_template(&self) -> Result<PathBuf> {
        existing_dir(self.root.join(SOLUTION_TEMPLATE_DIR))
    }

    /// Variant root for `(kind, variant)`.
    pub fn component_template(&self, kind: ComponentKind, variant: &str) -> Result<PathBuf> {
        existing_dir(self.root.join(kind.dir_name()).join(variant))
    }
}

fn existing_dir(path: PathBuf) -> Result<PathBuf> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(Error::TemplateDoesNotExistsError { template_dir: path.display().to_string() })
    }
}

/// Where components of `kind` are placed inside a solution.
pub fn component_dest<P: AsRef<Path>>(solution_dir: P, kind: Option<ComponentKind>) -> PathBuf {
    let mount_point = kind.map(|k| k.mount_point()).unwrap_or("src");
    solution_dir.as_ref().join(mount_point)
}

/// Where a variant tree is materialized.
///
/// Solution-rooted variants carry the mount point themselves and land on the solution
/// root; component-rooted variants are the component tree and land under the mount point.
pub fn variant_dest(solution_dir: &Path, variant_root: &Path, kind: ComponentKind) -> PathBuf {
    if variant_root.join(kind.mount_point()).is_dir() {
        solution_dir.to_path_buf()
    } else {
        component_dest(solution_dir, Some(kind))
    }
}

/// Optional `root-overlay/` inside a variant, merged into the solution root.
pub fn root_overlay<P: AsRef<Path>>(variant_root: P) -> Option<PathBuf> {
    let overlay = variant_root.as_ref().join(ROOT_OVERLAY_DIR);
    overlay.is_dir().then_some(overlay)
}
