use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::bail;

use crate::error::CompileError;

/// Something that rebuilds the whole template bundle.
///
/// The watch loop only needs pass/fail; the production implementation is
/// [`CompileCommand`], tests substitute counters.
pub trait TemplateCompiler: Send + Sync + 'static {
    /// Human-readable description of the invocation, used in startup logs.
    fn describe(&self) -> String;

    fn compile(&self) -> impl Future<Output = Result<(), CompileError>> + Send;
}

/// `<compiler> --output <output> <root>/{,**/}*.<ext>`
#[derive(Debug, Clone)]
pub struct CompileCommand {
    program: String,
    leading_args: Vec<String>,
    template_root: PathBuf,
    output: PathBuf,
    extension: String,
}

impl CompileCommand {
    /// `compiler` is split on whitespace; the first word is the program and the
    /// rest are passed before `--output` (e.g. `npx handlebars`).
    pub fn new(
        compiler: &str,
        template_root: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        extension: &str,
    ) -> anyhow::Result<Self> {
        let mut words = compiler.split_whitespace().map(str::to_string);
        let Some(program) = words.next() else {
            bail!("compiler command is empty");
        };
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            bail!("template extension is empty");
        }

        Ok(Self {
            program,
            leading_args: words.collect(),
            template_root: template_root.into(),
            output: output.into(),
            extension: extension.to_string(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The source glob exactly as a shell user would type it.
    pub fn source_glob(&self) -> String {
        format!(
            "{}/{{,**/}}*.{}",
            self.template_root.display(),
            self.extension
        )
    }

    /// Arguments as displayed, with the glob unexpanded.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push("--output".to_string());
        args.push(self.output.display().to_string());
        args.push(self.source_glob());
        args
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Expand the source glob to the template files currently on disk.
    ///
    /// `<root>/**/*.<ext>` covers both the root itself and every nested
    /// directory. Dotfiles and dot-directories are skipped and, with no
    /// matches, the literal glob is passed through, as a shell glob would do.
    pub fn expand_sources(&self) -> Vec<OsString> {
        let files = self.template_files();
        if files.is_empty() {
            return vec![OsString::from(self.source_glob())];
        }
        files.into_iter().map(PathBuf::into_os_string).collect()
    }

    /// Template files currently under the root, sorted.
    pub fn template_files(&self) -> Vec<PathBuf> {
        let root = glob::Pattern::escape(&self.template_root.to_string_lossy());
        let pattern = format!("{root}/**/*.{}", glob::Pattern::escape(&self.extension));

        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..Default::default()
        };

        let mut files: Vec<PathBuf> = match glob::glob_with(&pattern, options) {
            Ok(paths) => paths
                .filter_map(Result::ok)
                .filter(|p| p.is_file())
                .collect(),
            Err(err) => {
                tracing::warn!(pattern = %pattern, error = %err, "invalid template glob");
                Vec::new()
            }
        };
        files.sort();
        files
    }

    fn process_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.push(OsString::from("--output"));
        args.push(self.output.clone().into_os_string());
        args.extend(self.expand_sources());
        args
    }

    /// Run the compiler once and wait for it to exit.
    pub async fn run(&self) -> Result<(), CompileError> {
        let args = self.process_args();
        tracing::debug!(program = %self.program, args = ?args, "launching compiler");

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CompileError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(CompileError::Failed {
            command: self.command_line(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl TemplateCompiler for CompileCommand {
    fn describe(&self) -> String {
        self.command_line()
    }

    async fn compile(&self) -> Result<(), CompileError> {
        self.run().await
    }
}
