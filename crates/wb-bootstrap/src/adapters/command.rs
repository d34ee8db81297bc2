//! External command execution

use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

/// Failure running an external command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Run `program args...` to completion and return its trimmed stdout.
///
/// The child is killed if the returned future is dropped, so callers can
/// bound it with `tokio::time::timeout`.
pub async fn run_command<I>(program: &str, args: I) -> Result<String, CommandError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    let command = std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("Running `{}`", command);

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| CommandError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
