use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use hbs_watch::config::{HbsWatchConfig, WatchConfig};

/// Rebuild a bundled Handlebars templates file whenever a template changes.
///
/// hbs-watch watches the template directory recursively and runs the template
/// compiler over the whole tree on every created, modified or deleted template.
#[derive(Parser, Debug)]
#[command(
    name = "hbs-watch",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Project layout shared by every subcommand. Flags override `hbs-watch.toml`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Project root; relative template and output paths are resolved against it.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Template directory to watch (default: static/templates).
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Bundle file the compiler writes (default: static/js/templates.js).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compiler command, e.g. "handlebars" or "npx handlebars".
    #[arg(long)]
    pub compiler: Option<String>,

    /// Template file extension (default: handlebars).
    #[arg(long)]
    pub extension: Option<String>,

    /// Emit one JSON object per event on stdout instead of log lines.
    #[arg(long)]
    pub json: bool,
}

impl LayoutArgs {
    /// Load the project config file and apply these flags on top.
    pub fn resolve(&self) -> WatchConfig {
        let overrides = HbsWatchConfig {
            templates: self.templates.clone(),
            output: self.output.clone(),
            compiler: self.compiler.clone(),
            extension: self.extension.clone(),
        };
        HbsWatchConfig::load(&self.path)
            .merge(overrides)
            .resolve(&self.path)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the template directory and recompile on every template change.
    ///
    /// Runs until interrupted with Ctrl+C. Compile failures are logged and the
    /// watch continues.
    Watch {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Compile all templates once and exit (non-zero if the compiler fails).
    Compile {
        #[command(flatten)]
        layout: LayoutArgs,
    },
}
