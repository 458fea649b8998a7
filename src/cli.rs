//! Command-line interface implementation.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about = "spfx-scaffold: create SharePoint Framework solutions or add components to them", long_about = None)]
pub struct Args {
    /// Target directory. A new solution is created unless it already holds one
    #[arg(value_name = "TARGET", default_value = ".")]
    pub target: PathBuf,

    /// Component type: webpart, extension, library or adaptive-card-extension
    #[arg(short = 't', long = "template", value_name = "KIND")]
    pub kind: Option<String>,

    /// Template variant of the component type, e.g. minimal or react
    #[arg(long, value_name = "VARIANT")]
    pub variant: Option<String>,

    /// Component name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Package manager used to install dependencies (npm, pnpm or yarn)
    #[arg(long, value_name = "PM")]
    pub pm: Option<String>,

    /// Template library location: a directory, file:<path>, or a git url with an
    /// optional #branch[:subdir] suffix
    #[arg(long, value_name = "URL", conflicts_with = "templates_dir")]
    pub template_url: Option<String>,

    /// Local template library directory
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Extra glob pattern excluded when adding to an existing solution (repeatable)
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Install dependencies after generation without asking
    #[arg(short, long, conflicts_with = "skip_install")]
    pub install: bool,

    /// Never install dependencies
    #[arg(long, alias = "no-install")]
    pub skip_install: bool,

    /// How to treat placeholders without a value: strict, elide or keep
    #[arg(long, value_name = "MODE", default_value = "strict")]
    pub missing_tokens: String,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Install decision given by flags, if any.
    pub fn install_choice(&self) -> Option<bool> {
        if self.skip_install {
            Some(false)
        } else if self.install {
            Some(true)
        } else {
            None
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
