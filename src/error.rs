//! Error handling for spfx-scaffold.
//! Defines the crate error type and the result alias used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating, acquiring or materializing templates.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// A template file could not be read.
    #[error("Failed to read '{path}': {source}.")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file classified as text is not valid UTF-8.
    #[error("Template '{path}' is not valid UTF-8 (invalid byte at offset {offset}); drop its text extension to copy it verbatim.")]
    EncodingError { path: PathBuf, offset: usize },

    /// A destination file or directory could not be written.
    #[error("Failed to write '{path}': {source}.")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Traversal of a template tree failed.
    #[error("Failed to walk template tree: {0}.")]
    WalkError(#[from] walkdir::Error),

    #[error("Cannot proceed: template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },

    /// Represents errors that occur during template resolution
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// One or more placeholders had no value in the token table.
    #[error("Unresolved tokens: {}.", keys.join(", "))]
    UnresolvedTokens { keys: Vec<String> },

    /// A transformed entry name would escape its destination directory.
    #[error("Invalid output name '{name}' produced from '{source_path}'.")]
    InvalidOutputName { name: String, source_path: PathBuf },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors in exclusion glob patterns
    #[error("Exclusion pattern error: {0}.")]
    GlobError(#[from] globset::Error),

    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// The package manager exited unsuccessfully.
    #[error("'{command}' failed with status: {status}.")]
    InstallError { command: String, status: std::process::ExitStatus },
}

/// Convenience type alias for Results with `Error` as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
