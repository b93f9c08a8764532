//! Watch a Handlebars template tree and rebuild the bundle on every change.
//!
//! Every created, modified or deleted template under the root launches one
//! full recompilation through an external compiler. Other files are ignored.

pub mod compiler;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod rebuild;
pub mod watcher;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::sync::mpsc;

use crate::compiler::TemplateCompiler;
use crate::config::WatchConfig;
use crate::output::{Report, WatchReport};
use crate::rebuild::Rebuilder;
use crate::watcher::event::ChangeEvent;

/// Watch `config.template_root` and rebuild `config.output` until interrupted.
///
/// The OS watch is owned by this call and released on every exit path.
/// Compile failures are reported and never end the loop; only startup
/// problems (missing root, watch registration) return an error.
pub async fn run(config: &WatchConfig, reporter: Arc<dyn Report>) -> anyhow::Result<()> {
    ensure_template_root(&config.template_root)?;

    let command = config.compile_command()?;
    let templates = command.template_files().len();
    let rebuilder = Rebuilder::new(
        command,
        config.filter(),
        &config.output,
        Arc::clone(&reporter),
    );

    let (handle, rx) = watcher::start_watcher(&config.template_root).with_context(|| {
        format!(
            "failed to watch template directory {}",
            config.template_root.display()
        )
    })?;

    // Listen before announcing, so an interrupt right after `watching` is caught.
    let shutdown = shutdown_signal();

    tracing::debug!(command = %rebuilder.compiler().describe(), "compile command");
    reporter.report(WatchReport::Watching {
        root: config.template_root.clone(),
        output: config.output.clone(),
        templates,
    });

    watch_loop(&rebuilder, rx, shutdown).await;

    drop(handle);
    reporter.report(WatchReport::Stopped);
    Ok(())
}

/// Feed change events to `rebuilder` until `shutdown` resolves or the channel closes.
///
/// Never awaits a compile: each accepted event's rebuild runs on its own task.
pub async fn watch_loop<C, F>(
    rebuilder: &Rebuilder<C>,
    mut rx: mpsc::Receiver<ChangeEvent>,
    shutdown: F,
) where
    C: TemplateCompiler,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = rx.recv() => match event {
                Some(event) => {
                    rebuilder.dispatch(&event);
                }
                None => {
                    tracing::warn!("watcher channel closed");
                    break;
                }
            },
        }
    }
}

/// Compile the bundle once and report the outcome. Returns whether it succeeded.
pub async fn compile_once(config: &WatchConfig, reporter: &dyn Report) -> anyhow::Result<bool> {
    ensure_template_root(&config.template_root)?;
    let command = config.compile_command()?;
    tracing::debug!(command = %command.describe(), "compile command");

    match command.run().await {
        Ok(()) => {
            reporter.report(WatchReport::compiled(config.output.clone()));
            Ok(true)
        }
        Err(err) => {
            reporter.report(WatchReport::Failed {
                error: err.to_string(),
            });
            Ok(false)
        }
    }
}

fn ensure_template_root(root: &Path) -> anyhow::Result<()> {
    if !root.is_dir() {
        bail!("template directory {} does not exist", root.display());
    }
    Ok(())
}

/// Resolves on the first Ctrl+C. The OS handler is installed when this is called.
fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let listener = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt());
    #[cfg(windows)]
    let listener = tokio::signal::windows::ctrl_c();

    async move {
        match listener {
            Ok(mut listener) => {
                listener.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "unable to listen for Ctrl+C; run until killed");
                std::future::pending::<()>().await;
            }
        }
    }
}
