//! Template library acquisition.
//! Resolves `--template-url` values to a local directory, cloning git repositories
//! when needed.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, RemoteCallbacks};
use log::debug;
use url::Url;
use tempfile::TempDir;

use crate::error::{Error, Result};

const DEFAULT_BRANCH: &str = "main";

/// Represents the source location of a template library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository with the branch to check out and an optional subdirectory
    Git { url: String, branch: String, subdir: Option<String> },
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => write!(f, "local path: '{}'", path.display()),
            TemplateSource::Git { url, branch, .. } => {
                write!(f, "git repository: '{url}' (branch '{branch}')")
            }
        }
    }
}

/// Splits a `#branch[:subdir]` fragment.
fn split_fragment(fragment: Option<&str>) -> (String, Option<String>) {
    let fragment = fragment.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_BRANCH);
    match fragment.split_once(':') {
        Some((branch, subdir)) => {
            let branch = if branch.is_empty() { DEFAULT_BRANCH } else { branch };
            (branch.to_string(), Some(subdir.to_string()).filter(|s| !s.is_empty()))
        }
        None => (fragment.to_string(), None),
    }
}

impl TemplateSource {
    /// Parses a template location.
    ///
    /// Accepted forms:
    /// * `file:<path>` or a path to an existing directory
    /// * `https://github.com/<org>/<repo>[#branch[:subdir]]`
    /// * `git@host:org/repo[#branch[:subdir]]` and `git+ssh://...`
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(path) = s.strip_prefix("file:") {
            return Ok(Self::FileSystem(PathBuf::from(path)));
        }

        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "http" | "https") && url.host_str() == Some("github.com") {
                let segments: Vec<&str> =
                    url.path_segments().map(|s| s.filter(|p| !p.is_empty()).collect()).unwrap_or_default();
                if segments.len() == 2 {
                    let repo = segments[1].trim_end_matches(".git");
                    let (branch, subdir) = split_fragment(url.fragment());
                    return Ok(Self::Git {
                        url: format!("https://github.com/{}/{repo}.git", segments[0]),
                        branch,
                        subdir,
                    });
                }
            }
        }

        if s.starts_with("git@") || s.starts_with("git+ssh://") {
            let (repo, fragment) = match s.split_once('#') {
                Some((repo, fragment)) => (repo, Some(fragment)),
                None => (s, None),
            };
            let (branch, subdir) = split_fragment(fragment);
            let url = repo.strip_prefix("git+").unwrap_or(repo).to_string();
            return Ok(Self::Git { url, branch, subdir });
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            return Ok(Self::FileSystem(path));
        }

        Err(Error::TemplateError(format!("unsupported template url: {s}")))
    }
}

/// A template library on local disk.
///
/// Git checkouts are owned by this value and deleted when it is dropped.
#[derive(Debug)]
pub struct TemplateDir {
    path: PathBuf,
    checkout: Option<TempDir>,
}

impl TemplateDir {
    fn local(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::TemplateDoesNotExistsError { template_dir: path.display().to_string() });
        }
        Ok(Self { path: path.to_path_buf(), checkout: None })
    }

    /// Takes ownership of a checkout, pointing at `subdir` inside it when given.
    fn from_checkout(checkout: TempDir, subdir: Option<&str>) -> Result<Self> {
        let path = match subdir {
            Some(subdir) => checkout.path().join(subdir),
            None => checkout.path().to_path_buf(),
        };
        let mut dir = Self::local(&path)?;
        dir.checkout = Some(checkout);
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    fn load(&self) -> Result<TemplateDir>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    fn load(&self) -> Result<TemplateDir> {
        TemplateDir::local(self.path.as_ref())
    }
}

/// Loader for templates from git repositories.
///
/// Each load clones into a fresh temporary directory that lives as long as the
/// returned [`TemplateDir`].
pub struct GitLoader<'a> {
    url: &'a str,
    branch: &'a str,
    subdir: Option<&'a str>,
}

impl<'a> GitLoader<'a> {
    pub fn new(url: &'a str, branch: &'a str, subdir: Option<&'a str>) -> Self {
        Self { url, branch, subdir }
    }
}

impl TemplateLoader for GitLoader<'_> {
    fn load(&self) -> Result<TemplateDir> {
        let checkout = TempDir::with_prefix("spfx-tpl-")?;
        debug!("Cloning '{}' ({}) to '{}'.", self.url, self.branch, checkout.path().display());

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            let username = username_from_url.unwrap_or("git");
            Cred::ssh_key_from_agent(username).or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_default();
                Cred::ssh_key(username, None, &Path::new(&home).join(".ssh/id_rsa"), None)
            })
        });

        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks).depth(1);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts).branch(self.branch);
        builder.clone(self.url, checkout.path())?;

        TemplateDir::from_checkout(checkout, self.subdir)
    }
}

/// Returns the local template library for `template_url`.
pub fn load_template(template_url: &str) -> Result<TemplateDir> {
    let source = TemplateSource::parse(template_url)?;
    log::info!("Using templates from the {source}");

    match &source {
        TemplateSource::FileSystem(path) => LocalLoader::new(path).load(),
        TemplateSource::Git { url, branch, subdir } => {
            GitLoader::new(url, branch, subdir.as_deref()).load()
        }
    }
}
