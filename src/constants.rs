//! Conventions the template library is authored against.
//! Template authors depend on these being stable, so they are not configurable per call.

/// Marks a file whose content must be token-substituted; removed from the output name.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Written in place of a leading `.` inside the template library, restored on output.
pub const HIDDEN_FILE_PREFIX: &str = "dot-";

/// Hidden-file marker that replaces [`HIDDEN_FILE_PREFIX`].
pub const HIDDEN_FILE_MARKER: &str = ".";

/// Extensions (compared case-insensitively) whose content is always token-substituted.
pub const TEXT_EXTENSIONS: [&str; 8] = ["json", "js", "ts", "tsx", "md", "html", "scss", "css"];

/// Directory inside a variant that is merged into the solution root.
pub const ROOT_OVERLAY_DIR: &str = "root-overlay";

/// Directory of the base solution skeleton inside the template library.
pub const SOLUTION_TEMPLATE_DIR: &str = "solution";

/// Supported template library configuration file names
pub const LIBRARY_CONFIG_FILES: [&str; 3] = ["library.json", "library.yml", "library.yaml"];

/// Node major version the generated solutions target.
pub const REQUIRED_NODE_MAJOR: u32 = 22;

/// Token names shared by templates and the token table builders.
pub mod tokens {
    pub const SOLUTION_NAME: &str = "SOLUTION_NAME";
    pub const SOLUTION_TITLE: &str = "SOLUTION_TITLE";
    pub const SOLUTION_ID: &str = "SOLUTION_ID";
    pub const FEATURE_ID: &str = "FEATURE_ID";
    pub const COMPONENT_PASCAL: &str = "COMPONENT_PASCAL";
    pub const COMPONENT_CAMEL: &str = "COMPONENT_CAMEL";
    pub const COMPONENT_ID: &str = "COMPONENT_ID";
    pub const NODE_VERSION: &str = "NODE_VERSION";
}
