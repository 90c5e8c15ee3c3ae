// src/exec/command.rs

//! Shell-command tasks, used by the `taskweave` binary.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::exec::action::{ActionFuture, TaskAction};

/// A named shell command plus the integer keys sort rules can read.
///
/// Identity is the name: two tasks with the same name are the same task.
#[derive(Clone)]
pub struct CommandTask {
    pub name: String,
    pub cmd: String,
    pub keys: BTreeMap<String, i64>,
}

impl CommandTask {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            keys: BTreeMap::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, value: i64) -> Self {
        self.keys.insert(key.into(), value);
        self
    }

    pub fn key(&self, key: &str) -> Option<i64> {
        self.keys.get(key).copied()
    }
}

impl PartialEq for CommandTask {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CommandTask {}

impl Hash for CommandTask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

// Logs, errors and DOT labels show the bare task name.
impl fmt::Debug for CommandTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Runs a [`CommandTask`] through the platform shell.
///
/// The run parameter is the working directory for every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellAction;

impl TaskAction<CommandTask, PathBuf> for ShellAction {
    fn call(&self, task: CommandTask, cwd: PathBuf, cancel: CancellationToken) -> ActionFuture {
        Box::pin(async move { run_shell_command(&task, &cwd, &cancel).await })
    }
}

/// Spawn `task.cmd`, stream its output into the log, and wait for it.
///
/// A non-zero exit status is an error. If `cancel` fires first, the process
/// is killed and the call fails.
pub async fn run_shell_command(
    task: &CommandTask,
    cwd: &std::path::Path,
    cancel: &CancellationToken,
) -> Result<()> {
    info!(task = %task.name, cmd = %task.cmd, "starting task process");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&task.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&task.cmd);
        c
    };

    cmd.current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", task.name))?;

    // Drain both pipes so the child never blocks on a full buffer.
    if let Some(stdout) = child.stdout.take() {
        let name = task.name.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %name, "stdout: {}", line);
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let name = task.name.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %name, "stderr: {}", line);
            }
        });
    }

    tokio::select! {
        status = child.wait() => {
            let status = status
                .with_context(|| format!("waiting for process of task '{}'", task.name))?;
            let code = status.code().unwrap_or(-1);

            info!(
                task = %task.name,
                exit_code = code,
                success = status.success(),
                "task process exited"
            );

            if !status.success() {
                bail!("command `{}` exited with status {code}", task.cmd);
            }
            Ok(())
        }

        _ = cancel.cancelled() => {
            info!(task = %task.name, "run cancelled; killing task process");
            if let Err(e) = child.kill().await {
                warn!(task = %task.name, error = %e, "failed to kill child process on cancellation");
            }
            bail!("task '{}' was cancelled while running", task.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn identity_is_the_name() {
        let a = CommandTask::new("build", "make").with_key("stage", 1);
        let b = CommandTask::new("build", "cargo build");

        assert_eq!(a, b);
        let set: HashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(format!("{a:?}"), "build");
        assert_eq!(a.key("stage"), Some(1));
        assert_eq!(a.key("missing"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_is_reported() {
        let dir = std::env::temp_dir();
        let cancel = CancellationToken::new();

        let ok = CommandTask::new("ok", "true");
        assert!(run_shell_command(&ok, &dir, &cancel).await.is_ok());

        let failing = CommandTask::new("bad", "exit 3");
        let err = run_shell_command(&failing, &dir, &cancel).await.unwrap_err();
        assert!(err.to_string().contains("status 3"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_kills_the_process() {
        let dir = std::env::temp_dir();
        let cancel = CancellationToken::new();
        let task = CommandTask::new("sleepy", "sleep 30");

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            run_shell_command(&task, &dir, &cancel),
        )
        .await
        .expect("cancellation should end the command promptly");
        assert!(result.is_err());
    }
}
