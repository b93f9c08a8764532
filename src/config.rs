use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compiler::CompileCommand;
use crate::filter::{DEFAULT_EXTENSION, TemplateFilter};

/// Name of the optional project config file.
pub const CONFIG_FILE: &str = "hbs-watch.toml";

pub const DEFAULT_TEMPLATES: &str = "static/templates";
pub const DEFAULT_OUTPUT: &str = "static/js/templates.js";
pub const DEFAULT_COMPILER: &str = "handlebars";

/// Configuration loaded from `hbs-watch.toml` at the project root.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HbsWatchConfig {
    /// Template directory, relative to the project root.
    pub templates: Option<PathBuf>,
    /// Bundle destination, relative to the project root.
    pub output: Option<PathBuf>,
    /// Compiler command; extra words become leading arguments.
    pub compiler: Option<String>,
    /// Template file extension, with or without the leading dot.
    pub extension: Option<String>,
}

impl HbsWatchConfig {
    /// Load configuration from `hbs-watch.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Layer CLI overrides on top of the file values. `Some` always wins.
    pub fn merge(self, overrides: HbsWatchConfig) -> Self {
        Self {
            templates: overrides.templates.or(self.templates),
            output: overrides.output.or(self.output),
            compiler: overrides.compiler.or(self.compiler),
            extension: overrides.extension.or(self.extension),
        }
    }

    /// Fill defaults and resolve relative paths against `project_root`.
    pub fn resolve(&self, project_root: &Path) -> WatchConfig {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                project_root.join(p)
            }
        };

        WatchConfig {
            template_root: resolve(
                self.templates
                    .as_deref()
                    .unwrap_or(Path::new(DEFAULT_TEMPLATES)),
            ),
            output: resolve(self.output.as_deref().unwrap_or(Path::new(DEFAULT_OUTPUT))),
            compiler: self
                .compiler
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
            extension: self
                .extension
                .as_deref()
                .unwrap_or(DEFAULT_EXTENSION)
                .trim_start_matches('.')
                .to_string(),
        }
    }
}

/// Fully resolved settings for one watch or compile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub template_root: PathBuf,
    pub output: PathBuf,
    pub compiler: String,
    pub extension: String,
}

impl WatchConfig {
    pub fn filter(&self) -> TemplateFilter {
        TemplateFilter::new(&self.extension)
    }

    pub fn compile_command(&self) -> anyhow::Result<CompileCommand> {
        CompileCommand::new(
            &self.compiler,
            &self.template_root,
            &self.output,
            &self.extension,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tmp();
        let config = HbsWatchConfig::load(dir.path());
        assert_eq!(config, HbsWatchConfig::default());

        let resolved = config.resolve(dir.path());
        assert_eq!(resolved.template_root, dir.path().join("static/templates"));
        assert_eq!(resolved.output, dir.path().join("static/js/templates.js"));
        assert_eq!(resolved.compiler, "handlebars");
        assert_eq!(resolved.extension, "handlebars");
    }

    #[test]
    fn test_file_values_are_loaded() {
        let dir = tmp();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "templates = \"templates\"\ncompiler = \"npx handlebars\"\nextension = \".hbs\"\n",
        )
        .unwrap();

        let resolved = HbsWatchConfig::load(dir.path()).resolve(dir.path());
        assert_eq!(resolved.template_root, dir.path().join("templates"));
        assert_eq!(resolved.output, dir.path().join("static/js/templates.js"));
        assert_eq!(resolved.compiler, "npx handlebars");
        assert_eq!(resolved.extension, "hbs");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tmp();
        fs::write(dir.path().join(CONFIG_FILE), "templates = [not toml").unwrap();
        assert_eq!(HbsWatchConfig::load(dir.path()), HbsWatchConfig::default());

        fs::write(dir.path().join(CONFIG_FILE), "tempaltes = \"x\"\n").unwrap();
        assert_eq!(HbsWatchConfig::load(dir.path()), HbsWatchConfig::default());
    }

    #[test]
    fn test_overrides_win_and_absolute_paths_are_kept() {
        let dir = tmp();
        let abs_out = dir.path().join("elsewhere/bundle.js");
        let file = HbsWatchConfig {
            templates: Some(PathBuf::from("views")),
            compiler: Some("handlebars".to_string()),
            ..Default::default()
        };
        let cli = HbsWatchConfig {
            output: Some(abs_out.clone()),
            compiler: Some("hbs".to_string()),
            ..Default::default()
        };

        let resolved = file.merge(cli).resolve(Path::new("project"));
        assert_eq!(resolved.template_root, Path::new("project").join("views"));
        assert_eq!(resolved.output, abs_out);
        assert_eq!(resolved.compiler, "hbs");
    }
}
