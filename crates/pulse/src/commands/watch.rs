use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::str::FromStr;
use std::sync::Arc;

use chrono::Local;
use clap::ArgMatches;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pulse_config::{SettingsStore, ViewKind, ViewOverrides};
use pulse_core::{
    EnvironmentMonitor, ManualRefresh, RefreshError, RefreshFuture, RefreshOperation,
    RefreshStatus, ViewRefresher,
};

use super::helpers::{report, settings_path};
use crate::color;

/// Lines of stderr kept in a failed refresh's error message.
const STDERR_TAIL_LINES: usize = 3;

pub(crate) fn handle_watch_command(
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let view: ViewKind = matches
        .get_one::<String>("view")
        .ok_or("View argument is required")?
        .parse()
        .map_err(|e| report("cli.watch.view_invalid", e))?;
    let command = matches
        .get_one::<String>("command")
        .ok_or("Command argument is required")?
        .clone();
    let overrides = ViewOverrides {
        interval_ms: matches.get_one::<u64>("interval-ms").copied(),
        max_retries: matches.get_one::<u32>("max-retries").copied(),
        ..ViewOverrides::default()
    };
    let json_output = matches.get_flag("json");
    let path = settings_path(global);

    info!(
        event = "cli.watch_started",
        view = %view,
        command = %command,
        settings = %path.display(),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_watch(view, overrides, path, command, json_output));
    // A pending stdin read would otherwise hold the runtime open
    rt.shutdown_background();

    match &result {
        Ok(()) => info!(event = "cli.watch_completed", view = %view),
        Err(e) => {
            eprintln!("{} {}", color::error("Error:"), e);
            tracing::error!(event = "cli.watch_failed", view = %view, error = %e);
        }
    }
    result
}

async fn run_watch(
    view: ViewKind,
    overrides: ViewOverrides,
    settings_path: PathBuf,
    command: String,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::open(settings_path);
    let monitor = EnvironmentMonitor::default();
    let refresher = ViewRefresher::mount(
        view,
        overrides,
        &store,
        &monitor,
        ShellRefresh::new(command),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown_signal(shutdown.clone()));

    let mut status = refresher.subscribe();
    print_status(view, &status.borrow_and_update().clone(), json_output)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut manual: Option<LocalBoxFuture<'_, ManualRefresh>> = None;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                print_status(view, &current, json_output)?;
            }
            outcome = manual_outcome(&mut manual) => {
                manual = None;
                print_manual(&outcome);
            }
            line = lines.next_line() => match line? {
                None => {
                    info!(event = "cli.watch.stdin_closed");
                    break;
                }
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<Control>() {
                    Ok(Control::Hide) => monitor.set_visible(false),
                    Ok(Control::Show) => monitor.set_visible(true),
                    Ok(Control::Offline) => monitor.set_online(false),
                    Ok(Control::Online) => monitor.set_online(true),
                    Ok(Control::Refresh) => {
                        if manual.is_some() {
                            print_manual(&ManualRefresh::AlreadyRefreshing);
                        } else {
                            manual = Some(Box::pin(refresher.manual_refresh()));
                        }
                    }
                    Ok(Control::Status) => print_status(view, &refresher.status(), json_output)?,
                    Ok(Control::Quit) => break,
                    Err(message) => eprintln!("{} {}", color::warning("Warning:"), message),
                },
            },
        }
    }

    drop(manual);
    drop(refresher);
    Ok(())
}

async fn manual_outcome(slot: &mut Option<LocalBoxFuture<'_, ManualRefresh>>) -> ManualRefresh {
    match slot {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

/// Wait for SIGINT (or SIGTERM on unix), then cancel `token`.
async fn wait_for_shutdown_signal(token: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {
                        info!(event = "cli.watch.signal_received", signal = "SIGINT");
                    }
                    _ = sigterm.recv() => {
                        info!(event = "cli.watch.signal_received", signal = "SIGTERM");
                    }
                }
            }
            Err(e) => {
                warn!(event = "cli.watch.sigterm_register_failed", error = %e);
                ctrl_c.await.ok();
                info!(event = "cli.watch.signal_received", signal = "SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!(event = "cli.watch.signal_received", signal = "SIGINT");
    }

    token.cancel();
}

/// Refresh operation that runs a shell command; non-zero exit is a failure.
struct ShellRefresh {
    command: Arc<str>,
}

impl ShellRefresh {
    fn new(command: impl Into<Arc<str>>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl RefreshOperation for ShellRefresh {
    fn refresh(&self) -> RefreshFuture {
        let command = self.command.clone();
        Box::pin(async move {
            let output = tokio::process::Command::new("sh")
                .arg("-c")
                .arg(&*command)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|e| RefreshError::new(format!("failed to run refresh command: {e}")))?;

            if output.status.success() {
                Ok(())
            } else {
                Err(RefreshError::new(failure_message(
                    output.status,
                    &output.stderr,
                )))
            }
        })
    }
}

fn failure_message(status: ExitStatus, stderr: &[u8]) -> String {
    let exit = match status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };

    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];

    if tail.is_empty() {
        exit
    } else {
        format!("{exit}: {}", tail.join(" | "))
    }
}

/// Control line read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Hide,
    Show,
    Offline,
    Online,
    Refresh,
    Status,
    Quit,
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hide" => Ok(Control::Hide),
            "show" => Ok(Control::Show),
            "offline" => Ok(Control::Offline),
            "online" => Ok(Control::Online),
            "refresh" => Ok(Control::Refresh),
            "status" => Ok(Control::Status),
            "quit" | "exit" => Ok(Control::Quit),
            other => Err(format!(
                "Unknown control '{other}'. Expected one of: hide, show, offline, online, refresh, status, quit"
            )),
        }
    }
}

#[derive(Serialize)]
struct StatusLine<'a> {
    view: ViewKind,
    #[serde(flatten)]
    status: &'a RefreshStatus,
}

fn print_status(
    view: ViewKind,
    status: &RefreshStatus,
    json_output: bool,
) -> Result<(), serde_json::Error> {
    if json_output {
        println!("{}", serde_json::to_string(&StatusLine { view, status })?);
        return Ok(());
    }

    let last = status
        .last_refresh
        .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut line = format!(
        "[{}] {} last={} retries={}",
        color::accent(view.as_str()),
        color::state(status.state),
        last,
        status.retry_count
    );
    if !status.is_enabled {
        line.push_str(&color::muted(" disabled"));
    }
    if !status.is_visible {
        line.push_str(&color::muted(" hidden"));
    }
    if !status.is_online {
        line.push_str(&color::muted(" offline"));
    }
    if let Some(error) = &status.error {
        line.push_str(&format!(" error={}", color::failure(error)));
    }
    println!("{line}");
    Ok(())
}

fn print_manual(outcome: &ManualRefresh) {
    match outcome {
        ManualRefresh::Completed => println!("{}", color::success("Manual refresh completed")),
        ManualRefresh::Failed(message) => {
            println!("{} {}", color::failure("Manual refresh failed:"), message)
        }
        ManualRefresh::AlreadyRefreshing => {
            println!("{}", color::muted("A refresh is already running"))
        }
        ManualRefresh::NotStarted => println!("{}", color::muted("View is not mounted")),
        ManualRefresh::Cancelled => println!("{}", color::muted("Manual refresh cancelled")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_parse() {
        assert_eq!("hide".parse::<Control>(), Ok(Control::Hide));
        assert_eq!("  SHOW ".parse::<Control>(), Ok(Control::Show));
        assert_eq!("exit".parse::<Control>(), Ok(Control::Quit));
        let err = "reload".parse::<Control>().unwrap_err();
        assert!(err.contains("reload"));
        assert!(err.contains("refresh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_message_keeps_stderr_tail() {
        use std::os::unix::process::ExitStatusExt;

        let status = ExitStatus::from_raw(2 << 8);
        let stderr = b"connecting\n\nline two\nline three\nline four\n";
        assert_eq!(
            failure_message(status, stderr),
            "exit status 2: line two | line three | line four"
        );
        assert_eq!(failure_message(status, b""), "exit status 2");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_refresh_outcomes() {
        assert!(ShellRefresh::new("true").refresh().await.is_ok());

        let err = ShellRefresh::new("echo 'feed backend down' >&2; exit 3")
            .refresh()
            .await
            .unwrap_err();
        assert_eq!(err.message(), "exit status 3: feed backend down");
    }

    #[test]
    fn test_status_line_json_is_flat() {
        let status = RefreshStatus {
            state: pulse_core::SessionState::Scheduled,
            is_refreshing: false,
            last_refresh: None,
            error: None,
            retry_count: 1,
            is_enabled: true,
            is_visible: true,
            is_online: false,
        };
        let value = serde_json::to_value(StatusLine {
            view: ViewKind::Messages,
            status: &status,
        })
        .unwrap();
        assert_eq!(value["view"], "messages");
        assert_eq!(value["state"], "scheduled");
        assert_eq!(value["retry_count"], 1);
        assert_eq!(value["is_online"], false);
    }
}
