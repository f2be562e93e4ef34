//! # Command Execution Module / 命令执行模块
//!
//! Spawning hook processes and capturing their combined output, with support
//! for a timeout and for cooperative cancellation.
//!
//! 启动钩子进程并捕获其合并输出，支持超时和协作式取消。

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::infra::t;

/// How long to keep draining output after a process was killed. A grandchild
/// that inherited the pipes can hold them open past the kill.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// How a spawned process came to an end.
/// 已启动进程的结束方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// A hook command line after shell expansion and splitting.
/// 经过 shell 展开和拆分之后的钩子命令行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// The expanded text, kept for logs. / 展开后的文本，用于日志。
    pub display: String,
}

impl CommandLine {
    /// Expands `~` and `$VAR` references, then splits the line like a POSIX
    /// shell would. Variables are looked up in `vars` first, then in the
    /// process environment.
    ///
    /// 展开 `~` 和 `$VAR` 引用，然后像 POSIX shell 一样拆分命令行。
    /// 变量先在 `vars` 中查找，然后在进程环境中查找。
    pub fn parse(raw: &str, vars: &BTreeMap<String, String>) -> Result<Self> {
        let expanded = shellexpand::full_with_context(
            raw,
            || std::env::var("HOME").ok(),
            |name: &str| -> std::result::Result<Option<String>, std::env::VarError> {
                Ok(vars.get(name).cloned().or_else(|| std::env::var(name).ok()))
            },
        )
        .with_context(|| format!("Failed to expand command: {raw}"))?
        .to_string();

        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse command: {}", expanded))?;

        if parts.is_empty() {
            bail!("Empty command after parsing.");
        }

        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
            display: expanded,
        })
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Spawns a command and captures its stdout and stderr, interleaved line by
/// line into one string.
///
/// The process is killed when `timeout` elapses or `stop_token` is
/// cancelled; the returned `Completion` says which happened.
///
/// 启动一个命令并捕获其 stdout 和 stderr，逐行交错合并为一个字符串。
/// 当 `timeout` 到期或 `stop_token` 被取消时，进程会被终止；
/// 返回的 `Completion` 说明发生了哪种情况。
pub async fn spawn_and_capture(
    mut cmd: Command,
    timeout: Option<Duration>,
    stop_token: &CancellationToken,
) -> (std::io::Result<Completion>, String) {
    // The hook leads its own process group so a kill reaches whatever it started.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other(t!("command.capture_failed").to_string())),
            String::new(),
        );
    };

    let output = Arc::new(tokio::sync::Mutex::new(String::new()));
    let stdout_handle = tokio::spawn(pump_lines(stdout, Arc::clone(&output)));
    let stderr_handle = tokio::spawn(pump_lines(stderr, Arc::clone(&output)));

    let deadline = async {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };

    let completion = tokio::select! {
        status = child.wait() => status.map(Completion::Exited),
        _ = stop_token.cancelled() => kill(&mut child).await.map(|_| Completion::Cancelled),
        _ = deadline => kill(&mut child).await.map(|_| Completion::TimedOut),
    };

    let drain = async {
        let _ = stdout_handle.await;
        let _ = stderr_handle.await;
    };
    let grace = match completion {
        Ok(Completion::Exited(_)) => None,
        _ => Some(DRAIN_GRACE),
    };
    match grace {
        Some(grace) => {
            let _ = tokio::time::timeout(grace, drain).await;
        }
        None => drain.await,
    }

    let captured = output.lock().await.clone();
    (completion, captured)
}

async fn kill(child: &mut tokio::process::Child) -> std::io::Result<()> {
    #[cfg(unix)]
    if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        // ESRCH only means the group is already gone.
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
    child.start_kill()?;
    child.wait().await.map(|_| ())
}

async fn pump_lines<R>(stream: R, sink: Arc<tokio::sync::Mutex<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut output = sink.lock().await;
        output.push_str(&line);
        output.push('\n');
    }
}
