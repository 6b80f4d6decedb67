//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Plugin skeleton generator",
    long_about = "Stencil renders a template tree into a ready-to-build plugin \
                  project, substituting {{ Field }} tokens in paths and contents.",
    after_help = "EXAMPLES:\n\
        \x20 stencil new helm3 --module get.porter.sh/mixin/helm3\n\
        \x20 stencil new mysample --module github.com/acme/mysample --dry-run\n\
        \x20 stencil list --format json\n\
        \x20 stencil completions bash > /usr/share/bash-completion/completions/stencil",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new plugin project.
    #[command(
        visible_alias = "n",
        about = "Generate a new plugin project",
        after_help = "EXAMPLES:\n\
            \x20 stencil new helm3 --module get.porter.sh/mixin/helm3\n\
            \x20 stencil new helm3 -o ./work/helm3 --author-email sec@example.com\n\
            \x20 stencil new helm3 --template-dir ./my-template --skip-existing"
    )]
    New(NewArgs),

    /// List the entries of a template source.
    #[command(
        visible_alias = "ls",
        about = "List template entries",
        after_help = "EXAMPLES:\n\
            \x20 stencil list\n\
            \x20 stencil list --template-dir ./my-template\n\
            \x20 stencil list --format csv"
    )]
    List(ListArgs),

    /// Initialise a Stencil configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stencil init           # platform config directory\n\
            \x20 stencil init --local   # .stencil.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash > ~/.local/share/bash-completion/completions/stencil\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil\n\
            \x20 stencil completions fish > ~/.config/fish/completions/stencil.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Stencil configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stencil config get defaults.author_name\n\
            \x20 stencil config set defaults.module_prefix github.com/acme\n\
            \x20 stencil config list"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `stencil new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Plugin name, used for `PluginName` and the default output directory.
    #[arg(value_name = "PLUGIN_NAME", help = "Plugin name (e.g. helm3)")]
    pub name: String,

    /// Go module path.
    #[arg(
        short = 'm',
        long = "module",
        value_name = "PATH",
        help = "Module path (default: <defaults.module_prefix>/<name>)"
    )]
    pub module: Option<String>,

    #[arg(long = "author-name", value_name = "NAME", help = "Author name")]
    pub author_name: Option<String>,

    #[arg(long = "author-email", value_name = "EMAIL", help = "Security contact email")]
    pub author_email: Option<String>,

    #[arg(long = "description", value_name = "TEXT", help = "One-line description")]
    pub description: Option<String>,

    /// Destination root.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory (default: ./<name>)"
    )]
    pub output: Option<PathBuf>,

    /// Replace files that already exist.
    #[arg(long = "force", conflicts_with = "skip_existing", help = "Overwrite existing files")]
    pub force: bool,

    /// Keep files that already exist.
    #[arg(long = "skip-existing", help = "Leave existing files untouched")]
    pub skip_existing: bool,

    /// Preview what would be created without writing any files.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    /// Template directory to render instead of the bundled skeleton.
    #[arg(long = "template-dir", value_name = "DIR", help = "Use a template directory")]
    pub template_dir: Option<PathBuf>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Template directory to list instead of the bundled skeleton.
    #[arg(long = "template-dir", value_name = "DIR", help = "List a template directory")]
    pub template_dir: Option<PathBuf>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One source path per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.stencil.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stencil completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stencil config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.author_name`.
        key: String,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
