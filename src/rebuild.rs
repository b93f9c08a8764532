use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::compiler::TemplateCompiler;
use crate::filter::TemplateFilter;
use crate::output::{Report, WatchReport};
use crate::watcher::event::ChangeEvent;

/// Filters change events and launches one full rebuild per accepted event.
///
/// There is no debouncing and no mutual exclusion: a burst of N template
/// events launches N compiles, which may overlap and finish in any order.
pub struct Rebuilder<C> {
    compiler: Arc<C>,
    filter: TemplateFilter,
    output: PathBuf,
    reporter: Arc<dyn Report>,
}

impl<C: TemplateCompiler> Rebuilder<C> {
    pub fn new(
        compiler: C,
        filter: TemplateFilter,
        output: impl Into<PathBuf>,
        reporter: Arc<dyn Report>,
    ) -> Self {
        Self {
            compiler: Arc::new(compiler),
            filter,
            output: output.into(),
            reporter,
        }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Handle one change event.
    ///
    /// Non-template paths are dropped silently and `None` is returned. For a
    /// template the change is reported before this returns, and the compile runs
    /// on a spawned task whose handle is returned; the caller does not need to
    /// await it. Must be called from within a tokio runtime.
    pub fn dispatch(&self, event: &ChangeEvent) -> Option<JoinHandle<()>> {
        if !self.filter.matches(&event.path) {
            return None;
        }

        self.reporter.report(WatchReport::Changed {
            path: event.path.clone(),
            kind: event.kind,
        });

        Some(self.spawn_compile())
    }

    /// Launch a compile and report its outcome when it finishes.
    fn spawn_compile(&self) -> JoinHandle<()> {
        let compiler = Arc::clone(&self.compiler);
        let reporter = Arc::clone(&self.reporter);
        let output = self.output.clone();

        tokio::spawn(async move {
            let report = match compiler.compile().await {
                Ok(()) => WatchReport::compiled(output),
                Err(err) => WatchReport::Failed {
                    error: err.to_string(),
                },
            };
            reporter.report(report);
        })
    }
}
