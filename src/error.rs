//! Errors surfaced by a compile invocation.
//!
//! Both variants mean the same thing to the watch loop: the bundle was not
//! rebuilt. They are reported and swallowed, never propagated.

use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    /// The compiler process could not be started at all.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran and exited unsuccessfully.
    #[error("`{command}` exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
