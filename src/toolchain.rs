//! Package manager selection, dependency installation and node version probing.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use log::{debug, warn};

use crate::constants::REQUIRED_NODE_MAJOR;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// Detects the package manager that launched the tool from its user agent string,
    /// e.g. `pnpm/9.1.0 npm/? node/v22.2.0 linux x64`.
    pub fn detect(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.contains("pnpm") => PackageManager::Pnpm,
            Some(ua) if ua.contains("yarn") => PackageManager::Yarn,
            _ => PackageManager::Npm,
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Runs `<pm> install` in `cwd` with inherited stdio.
    pub fn install<P: AsRef<Path>>(&self, cwd: P) -> Result<()> {
        let command = format!("{} install", self.command());
        debug!("Running '{command}' in '{}'", cwd.as_ref().display());

        let status = Command::new(self.command())
            .arg("install")
            .current_dir(cwd.as_ref())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            return Err(Error::InstallError { command, status });
        }
        Ok(())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for PackageManager {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(PackageManager::Npm),
            "pnpm" => Ok(PackageManager::Pnpm),
            "yarn" => Ok(PackageManager::Yarn),
            other => Err(Error::ConfigError(format!("unsupported package manager '{other}'"))),
        }
    }
}

/// Parses the major version out of `node --version` output such as `v22.2.0`.
pub fn parse_node_major(output: &str) -> Option<u32> {
    output.trim().trim_start_matches('v').split('.').next()?.parse().ok()
}

/// Major version of the `node` on PATH, if any.
pub fn node_major_version() -> Option<u32> {
    let output = Command::new("node").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_node_major(&String::from_utf8_lossy(&output.stdout))
}

/// Node major version written into generated solutions.
///
/// Falls back to the required version when node is missing; warns when the installed
/// version is too old to build the generated solution.
pub fn target_node_major(installed: Option<u32>) -> u32 {
    match installed {
        Some(major) if major < REQUIRED_NODE_MAJOR => {
            warn!(
                "Node {major} detected. Generated solutions require Node >= {REQUIRED_NODE_MAJOR} to build and run."
            );
            major
        }
        Some(major) => major,
        None => {
            debug!("node not found, assuming Node {REQUIRED_NODE_MAJOR}");
            REQUIRED_NODE_MAJOR
        }
    }
}
