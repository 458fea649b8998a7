//! Token table and placeholder substitution.
//!
//! A placeholder is `{{KEY}}` where `KEY` consists of word characters only. Keys are
//! matched case-sensitively against the table. What happens to a key that has no entry
//! is decided by [`MissingTokens`].

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::LazyLock;

use cruet::Inflector;
use indexmap::IndexMap;
use log::warn;
use regex::{Captures, Regex};
use uuid::Uuid;

use crate::constants::tokens::*;
use crate::error::Error;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// How placeholders without a table entry are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTokens {
    /// Collect every unresolved key and fail the pass before anything is written.
    #[default]
    Strict,
    /// Replace with the empty string.
    Elide,
    /// Leave the placeholder untouched for a later pass.
    Keep,
}

impl FromStr for MissingTokens {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "elide" => Ok(Self::Elide),
            "keep" => Ok(Self::Keep),
            other => Err(Error::ConfigError(format!(
                "unknown missing-token mode '{other}' (expected strict, elide or keep)"
            ))),
        }
    }
}

/// Result of substituting tokens into one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub output: String,
    /// Keys referenced by the input that have no entry in the table.
    pub unresolved: BTreeSet<String>,
}

/// Immutable mapping from symbolic keys to replacement values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    values: IndexMap<String, String>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token, replacing any previous value for the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Tokens for creating a brand-new solution named `name`.
    ///
    /// Every identifier token receives its own freshly generated GUID.
    pub fn for_solution(name: &str, node_major: u32) -> Self {
        Self::new()
            .with(SOLUTION_NAME, name)
            .with(SOLUTION_TITLE, to_title_case(name))
            .with(SOLUTION_ID, new_upper_guid())
            .with(FEATURE_ID, new_upper_guid())
            .with(COMPONENT_PASCAL, to_pascal_case(name))
            .with(COMPONENT_CAMEL, to_camel_case(name))
            .with(COMPONENT_ID, new_upper_guid())
            .with(NODE_VERSION, node_major.to_string())
    }

    /// Tokens for adding a component named `name` to an existing solution.
    pub fn for_component(name: &str) -> Self {
        Self::new()
            .with(COMPONENT_PASCAL, to_pascal_case(name))
            .with(COMPONENT_CAMEL, to_camel_case(name))
            .with(COMPONENT_ID, new_upper_guid())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every placeholder in `input`.
    ///
    /// Unresolved keys are always reported in the result. In `Strict` and `Keep` mode the
    /// placeholder is left as written; `Elide` drops it.
    pub fn substitute(&self, input: &str, missing: MissingTokens) -> Substitution {
        let mut unresolved = BTreeSet::new();
        let output = PLACEHOLDER.replace_all(input, |caps: &Captures| {
            let key = &caps[1];
            match self.values.get(key) {
                Some(value) => value.clone(),
                None => {
                    unresolved.insert(key.to_string());
                    match missing {
                        MissingTokens::Elide => {
                            warn!("Token '{key}' has no value, replacing with empty string");
                            String::new()
                        }
                        MissingTokens::Strict | MissingTokens::Keep => caps[0].to_string(),
                    }
                }
            }
        });

        Substitution { output: output.into_owned(), unresolved }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Returns true when `input` still contains a `{{KEY}}` placeholder.
pub fn contains_placeholder(input: &str) -> bool {
    PLACEHOLDER.is_match(input)
}

pub fn to_pascal_case(input: &str) -> String {
    input.to_pascal_case()
}

pub fn to_camel_case(input: &str) -> String {
    input.to_camel_case()
}

pub fn to_title_case(input: &str) -> String {
    input.to_title_case()
}

/// A fresh v4 GUID in the upper-case hyphenated form SharePoint manifests use.
pub fn new_upper_guid() -> String {
    Uuid::new_v4().hyphenated().to_string().to_uppercase()
}
