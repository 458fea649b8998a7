//! Per-entry classification and output naming.
//!
//! Names are transformed in a fixed order: token substitution, then hidden-file
//! unescaping, then template-suffix stripping. Reordering changes the result for names
//! that satisfy more than one rule (e.g. `dot-{{NAME}}rc.tmpl`).

use std::collections::BTreeSet;
use std::fs::FileType;
use std::path::Path;

use crate::constants::{HIDDEN_FILE_MARKER, HIDDEN_FILE_PREFIX, TEMPLATE_SUFFIX, TEXT_EXTENSIONS};
use crate::tokens::{MissingTokens, TokenTable};

/// What the materializer does with a source entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    /// Content is read as UTF-8 and token-substituted.
    Text,
    /// Content is copied byte-for-byte.
    Binary,
}

impl EntryKind {
    pub fn classify(name: &str, file_type: FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if should_templatize(name) {
            EntryKind::Text
        } else {
            EntryKind::Binary
        }
    }
}

/// Whether a file's content participates in token substitution.
///
/// Decided on the source name, before any renaming. Escaped hidden files without an
/// extension (`dot-env`, `dot-npmrc`) are configuration text; `dot-logo.png` is not.
pub fn should_templatize(name: &str) -> bool {
    if name.ends_with(TEMPLATE_SUFFIX) {
        return true;
    }
    if name.starts_with(HIDDEN_FILE_PREFIX) && Path::new(&unescape_hidden(name)).extension().is_none() {
        return true;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(ext)))
}

/// Restores a leading hidden-file marker: `dot-env` becomes `.env`.
pub fn unescape_hidden(name: &str) -> String {
    match name.strip_prefix(HIDDEN_FILE_PREFIX) {
        Some(rest) => format!("{HIDDEN_FILE_MARKER}{rest}"),
        None => name.to_string(),
    }
}

/// Drops the template suffix: `package.json.tmpl` becomes `package.json`.
pub fn strip_template_suffix(name: &str) -> String {
    name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(name).to_string()
}

/// An entry name after transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    pub name: String,
    pub unresolved: BTreeSet<String>,
}

/// Computes the output name for one path component.
pub fn transform_name(name: &str, tokens: &TokenTable, missing: MissingTokens) -> OutputName {
    let substituted = tokens.substitute(name, missing);
    let name = strip_template_suffix(&unescape_hidden(&substituted.output));
    OutputName { name, unresolved: substituted.unresolved }
}

/// Rejects names that would leave the directory they are written into.
pub fn is_safe_output_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
