//! spfx-scaffold's main application entry point and orchestration logic.
//! Handles command-line argument parsing, mode detection and the generation flow.

use std::path::Path;

use spfx_scaffold::{
    cli::{get_args, Args},
    config::Settings,
    error::{default_error_handler, Result},
    loader::load_template,
    locator::{ComponentKind, TemplateLibrary},
    materialize::Manifest,
    policy::ExclusionSet,
    prompt::{resolve_answers, DialoguerPrompter, Preset},
    scaffold::{Mode, Scaffolder},
    toolchain::{node_major_version, target_node_major, PackageManager},
    tokens::MissingTokens,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose { log::LevelFilter::Trace } else { log::LevelFilter::Off })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn print_manifest(manifest: &Manifest, root: &Path) {
    for entry in manifest.files() {
        let action = if entry.overwritten { "Overwritten" } else { "Created" };
        let shown = entry.path.strip_prefix(root).unwrap_or(&entry.path);
        println!("{action}: '{}'", shown.display());
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Captures ambient settings and locates the template library
/// 2. Detects whether the target already holds a solution
/// 3. Prompts for answers not given as flags
/// 4. Creates the solution or adds the component
/// 5. Installs dependencies when requested
fn run(args: Args) -> Result<()> {
    let missing: MissingTokens = args.missing_tokens.parse()?;
    let settings = Settings::from_env(args.templates_dir.clone(), missing);

    // A cloned library is removed when `template_dir` goes out of scope.
    let template_dir = args.template_url.as_deref().map(load_template).transpose()?;
    let library = match &template_dir {
        Some(dir) => TemplateLibrary::open(dir.path())?,
        None => TemplateLibrary::discover(settings.templates_dir.as_deref(), settings.exe_dir.as_deref())?,
    };

    let target = std::path::absolute(&args.target)?;
    let mode = Mode::detect(&target);

    let preset = Preset {
        kind: args.kind.as_deref().map(str::parse::<ComponentKind>).transpose()?,
        variant: args.variant.clone(),
        name: args.name.clone(),
        install: args.install_choice(),
    };
    let prompter = DialoguerPrompter::new();
    let answers = resolve_answers(&prompter, &library, mode, preset)?;

    let pm = match &args.pm {
        Some(pm) => pm.parse::<PackageManager>()?,
        None => PackageManager::detect(settings.user_agent.as_deref()),
    };

    let scaffolder = Scaffolder::new(&library).with_missing_tokens(settings.missing_tokens);
    let manifest = match mode {
        Mode::Create => {
            let node_major = target_node_major(node_major_version());
            scaffolder.scaffold_new_solution(&target, &answers.request, node_major)?
        }
        Mode::Add => {
            let exclusions = ExclusionSet::protected().with_patterns(&args.excludes)?;
            scaffolder.add_component(&target, &answers.request, exclusions)?
        }
    };
    print_manifest(&manifest, &target);

    if answers.install {
        println!("Installing dependencies with {pm}...");
        pm.install(&target)?;
    }

    match mode {
        Mode::Create => {
            println!("Solution '{}' created in {}.", answers.request.name, target.display());
            println!("Next steps:");
            if let Ok(cwd) = std::env::current_dir() {
                if let Ok(rel) = target.strip_prefix(&cwd) {
                    if !rel.as_os_str().is_empty() {
                        println!("  cd {}", rel.display());
                    }
                }
            }
            if !answers.install {
                println!("  {pm} install");
            }
            println!("  gulp serve");
        }
        Mode::Add => {
            println!("{} '{}' added to {}.", answers.request.kind, answers.request.name, target.display());
            println!("Try: gulp serve");
        }
    }
    Ok(())
}
