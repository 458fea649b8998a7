//! User interaction for answers not given on the command line.

use dialoguer::{Confirm, Input, Select};

use crate::config::VariantChoice;
use crate::error::{Error, Result};
use crate::locator::{ComponentKind, TemplateLibrary};
use crate::scaffold::{ComponentRequest, Mode};

const DEFAULT_NAME: &str = "HelloWorld";

/// Trait for asking the user questions.
pub trait Prompter {
    /// Returns the index of the chosen item.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    fn text(&self, prompt: &str, default: &str) -> Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Ok(Select::new().with_prompt(prompt).default(default).items(items).interact()?)
    }

    fn text(&self, prompt: &str, default: &str) -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .validate_with(|input: &String| validate_name(input).map_err(|e| e.to_string()))
            .interact_text()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
    }
}

/// Component and solution names become directory names and identifiers.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.trim().is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::ConfigError(format!(
            "invalid name '{name}': use letters, digits, dash and underscore only"
        )))
    }
}

/// Answers supplied up front; anything missing is asked for.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    pub kind: Option<ComponentKind>,
    pub variant: Option<String>,
    pub name: Option<String>,
    pub install: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub request: ComponentRequest,
    pub install: bool,
}

fn name_question(kind: ComponentKind, variant: &str, choices: &[VariantChoice]) -> String {
    match kind {
        ComponentKind::WebPart => "What is your web part name?".to_string(),
        ComponentKind::Library => "What is your library name?".to_string(),
        ComponentKind::AdaptiveCardExtension => {
            "What is your Adaptive Card Extension name?".to_string()
        }
        ComponentKind::Extension => {
            let label = choices
                .iter()
                .find(|c| c.value == variant)
                .map(|c| c.title.as_str())
                .unwrap_or("extension");
            format!("What is your {label} name?")
        }
    }
}

/// Completes `preset` by prompting for every missing answer.
///
/// Kinds with a single variant are not asked about it.
pub fn resolve_answers(
    prompter: &dyn Prompter,
    library: &TemplateLibrary,
    mode: Mode,
    preset: Preset,
) -> Result<Answers> {
    let kind = match preset.kind {
        Some(kind) => kind,
        None => {
            let question = match mode {
                Mode::Add => "What type of component do you want to add?",
                Mode::Create => "What type of solution do you want to create?",
            };
            let titles: Vec<String> = ComponentKind::ALL.iter().map(|k| k.title().to_string()).collect();
            let index = prompter.select(question, &titles, 0)?;
            ComponentKind::ALL
                .get(index)
                .copied()
                .ok_or_else(|| Error::ConfigError(format!("invalid component selection {index}")))?
        }
    };

    let choices = library.variants(kind);
    let variant = match preset.variant {
        Some(variant) => variant,
        None if choices.len() == 1 => choices[0].value.clone(),
        None if choices.is_empty() => {
            return Err(Error::ConfigError(format!("no variants configured for '{kind}'")));
        }
        None => {
            let question = match kind {
                ComponentKind::Extension => "Which type of client-side extension would you like to create?",
                _ => "Which template would you like to use?",
            };
            let titles: Vec<String> = choices.iter().map(|c| c.title.clone()).collect();
            let index = prompter.select(question, &titles, 0)?;
            choices
                .get(index)
                .map(|c| c.value.clone())
                .ok_or_else(|| Error::ConfigError(format!("invalid variant selection {index}")))?
        }
    };

    let name = match preset.name {
        Some(name) => name,
        None => prompter.text(&name_question(kind, &variant, &choices), DEFAULT_NAME)?,
    };
    validate_name(&name)?;

    let install = match preset.install {
        Some(install) => install,
        None => prompter.confirm("Install dependencies now?", true)?,
    };

    Ok(Answers { request: ComponentRequest { kind, variant, name }, install })
}
