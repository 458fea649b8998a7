//! spfx-scaffold generates SharePoint Framework solutions, or adds components to
//! existing ones, by materializing directory-tree templates with token substitution
//! in file names and contents.

/// Per-entry classification and output naming
pub mod classify;

/// Command-line interface module
pub mod cli;

/// Library configuration and ambient settings
pub mod config;

/// Template authoring conventions
pub mod constants;

/// Error types and handling
pub mod error;

/// Template library acquisition (local directories and git repositories)
pub mod loader;

/// Template library layout and component mount points
pub mod locator;

/// Core tree materialization engine
pub mod materialize;

/// Inclusion policies for create and add modes
pub mod policy;

/// User input and interaction handling
pub mod prompt;

/// Create and add mode orchestration
pub mod scaffold;

/// Inspection and post-processing of generated solutions
pub mod solution;

/// Token tables and placeholder substitution
pub mod tokens;

/// Package manager and node toolchain helpers
pub mod toolchain;
