//! Spawning the script runner and relaying its exit.

use crate::error::PlayError;
use crate::install::{self, EnsureOptions};
use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;
use std::sync::atomic::{AtomicU32, Ordering};

/// How to run a script.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Runner executable name (normally `tsx`).
    pub runner: String,
    pub watch: bool,
    pub tsconfig_path: Option<PathBuf>,
    pub auto_install: bool,
    pub debug: bool,
}

/// Arguments passed to the runner: `[watch] [--tsconfig <path>] <file>`.
#[must_use]
pub fn runner_args(file_path: &Path, options: &RunnerOptions) -> Vec<OsString> {
    let mut args = Vec::new();

    if options.watch {
        args.push(OsString::from("watch"));
    }

    if let Some(tsconfig) = &options.tsconfig_path
        && tsconfig.exists()
    {
        args.push(OsString::from("--tsconfig"));
        args.push(tsconfig.clone().into_os_string());
    }

    args.push(file_path.as_os_str().to_os_string());
    args
}

/// Locate the runner: `node_modules/.bin` in `start` or an ancestor, then `PATH`.
/// Falls back to the bare name and lets spawning report the failure.
#[must_use]
pub fn resolve_runner(runner: &str, start: &Path) -> PathBuf {
    let local = start
        .ancestors()
        .map(|dir| dir.join("node_modules").join(".bin").join(runner))
        .find(|candidate| candidate.is_file());

    local
        .or_else(|| which::which(runner).ok())
        .unwrap_or_else(|| PathBuf::from(runner))
}

fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn print_execution_info(file_path: &Path, args: &[OsString], options: &RunnerOptions, cwd: &Path) {
    println!(
        "{}{}",
        "\n✅ Executing: ".green().bold(),
        display_path(file_path, cwd).cyan()
    );

    if options.watch {
        println!("{}", "👀 Watch mode enabled".magenta().bold());
    }

    if let Some(tsconfig) = &options.tsconfig_path {
        println!(
            "{}{}",
            "📝 Using tsconfig: ".cyan().bold(),
            display_path(tsconfig, cwd).yellow()
        );
    }

    if options.debug {
        let tsconfig = options
            .tsconfig_path
            .as_ref()
            .map_or_else(|| "default".to_string(), |p| p.display().to_string());
        let command = std::iter::once(options.runner.clone())
            .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");

        println!("{}", "\n🔍 Debug Info".blue().bold());
        println!("  {}       {}", "File:".bold(), file_path.display().to_string().cyan());
        println!("  {}   {}", "Tsconfig:".bold(), tsconfig.cyan());
        println!("  {}      {}", "Watch:".bold(), options.watch.to_string().yellow());
        println!("  {}    {}", "Command:".bold(), command.green());
    }

    println!();
}

/// Run `file_path` with the configured runner, blocking until it exits.
///
/// Returns the runner's exit code (0 when it was terminated without one).
///
/// # Errors
///
/// Returns `Err` if auto-install fails or the runner cannot be spawned.
pub fn run(file_path: &Path, options: &RunnerOptions) -> Result<i32, PlayError> {
    let cwd = std::env::current_dir().unwrap_or_else(|e| {
        tracing::warn!("Cannot determine current directory: {e}");
        PathBuf::from(".")
    });
    let args = runner_args(file_path, options);

    print_execution_info(file_path, &args, options, &cwd);

    if options.auto_install {
        install::ensure_package(&options.runner, &cwd, &EnsureOptions::default())?;
    }

    let program = resolve_runner(&options.runner, &cwd);
    tracing::debug!("spawning {} {:?}", program.display(), args);

    install_signal_relay();
    let mut child = Command::new(&program)
        .args(&args)
        .spawn()
        .map_err(PlayError::Spawn)?;

    CHILD_PID.store(child.id(), Ordering::SeqCst);
    let status = child.wait();
    CHILD_PID.store(0, Ordering::SeqCst);
    let status = status.map_err(PlayError::Wait)?;
    let code = status.code().unwrap_or(0);
    if code != 0 {
        println!(
            "{}{}",
            "\n⚠️  Process exited with code: ".yellow().bold(),
            code.to_string().red().bold()
        );
    }
    Ok(code)
}

/// Pid of the runner currently being waited on; 0 when there is none.
static CHILD_PID: AtomicU32 = AtomicU32::new(0);
static RELAY: Once = Once::new();

/// Install the process-wide SIGINT/SIGTERM relay. Later calls are no-ops; the
/// relay always targets whatever child [`CHILD_PID`] names at signal time and
/// forwards the signal it received.
#[cfg(unix)]
fn install_signal_relay() {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    RELAY.call_once(|| {
        let action = SigAction::new(
            SigHandler::Handler(relay_signal),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        for signal in [Signal::SIGINT, Signal::SIGTERM] {
            // SAFETY: `relay_signal` only loads an atomic and makes
            // async-signal-safe calls.
            if let Err(e) = unsafe { sigaction(signal, &action) } {
                tracing::warn!("Cannot install {signal:?} handler: {e}");
            }
        }
    });
}

#[cfg(unix)]
extern "C" fn relay_signal(signum: nix::libc::c_int) {
    use nix::sys::signal::{SigHandler, Signal, kill, raise, signal};
    use nix::unistd::Pid;

    let Ok(received) = Signal::try_from(signum) else {
        return;
    };
    let pid = CHILD_PID.load(Ordering::SeqCst);

    // No runner in flight: behave as if no handler were installed.
    if pid == 0 {
        // SAFETY: restoring the default disposition is async-signal-safe.
        let _ = unsafe { signal(received, SigHandler::SigDfl) };
        let _ = raise(received);
        return;
    }
    let Ok(pid) = i32::try_from(pid) else {
        return;
    };
    let message = "\n👋 Exiting...\n".as_bytes();
    // SAFETY: `message` is valid for `message.len()` bytes.
    let _ = unsafe {
        nix::libc::write(nix::libc::STDOUT_FILENO, message.as_ptr().cast(), message.len())
    };
    let _ = kill(Pid::from_raw(pid), received);
}

// The child shares the console and receives Ctrl+C itself; the launcher
// only has to survive it to report the child's exit code.
#[cfg(not(unix))]
fn install_signal_relay() {
    RELAY.call_once(|| {
        let result = ctrlc::set_handler(|| {
            if CHILD_PID.load(Ordering::SeqCst) != 0 {
                println!("{}", "\n👋 Exiting...".magenta().bold());
            }
        });
        if let Err(e) = result {
            tracing::warn!("Cannot install signal handler: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options() -> RunnerOptions {
        RunnerOptions {
            runner: "tsx".to_string(),
            ..RunnerOptions::default()
        }
    }

    #[test]
    fn test_runner_args_plain() {
        let args = runner_args(Path::new("/work/index.ts"), &options());
        assert_eq!(args, [OsString::from("/work/index.ts")]);
    }

    #[test]
    fn test_runner_args_watch_and_tsconfig() {
        let temp = tempfile::TempDir::new().unwrap();
        let tsconfig = temp.path().join("tsconfig.json");
        fs::write(&tsconfig, "{}").unwrap();

        let opts = RunnerOptions {
            watch: true,
            tsconfig_path: Some(tsconfig.clone()),
            ..options()
        };
        let args = runner_args(Path::new("demo.ts"), &opts);
        assert_eq!(
            args,
            [
                OsString::from("watch"),
                OsString::from("--tsconfig"),
                tsconfig.into_os_string(),
                OsString::from("demo.ts"),
            ]
        );
    }

    #[test]
    fn test_runner_args_skip_missing_tsconfig() {
        let opts = RunnerOptions {
            tsconfig_path: Some(PathBuf::from("/definitely/not/here/tsconfig.json")),
            ..options()
        };
        let args = runner_args(Path::new("demo.ts"), &opts);
        assert_eq!(args, [OsString::from("demo.ts")]);
    }

    #[test]
    fn test_resolve_runner_prefers_local_bin() {
        let temp = tempfile::TempDir::new().unwrap();
        let bin = temp.path().join("node_modules").join(".bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("tsx"), "#!/bin/sh\n").unwrap();
        let nested = temp.path().join("playground");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(resolve_runner("tsx", &nested), bin.join("tsx"));
    }

    #[test]
    fn test_resolve_runner_falls_back_to_name() {
        let temp = tempfile::TempDir::new().unwrap();
        assert_eq!(
            resolve_runner("no-such-runner-on-path-xyz", temp.path()),
            PathBuf::from("no-such-runner-on-path-xyz")
        );
    }

    #[cfg(unix)]
    fn trap_runner(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("runner.sh");
        fs::write(
            &script,
            "#!/bin/sh\n\
             trap 'echo INT > \"$1.seen\"; exit 3' INT\n\
             trap 'echo TERM > \"$1.seen\"; exit 4' TERM\n\
             touch \"$1.ready\"\n\
             while :; do sleep 0.1; done\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_relay_targets_current_child_on_later_runs() {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::getpid;
        use std::time::Duration;

        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("demo.ts");
        fs::write(&file, "").unwrap();

        let first = RunnerOptions {
            runner: "true".to_string(),
            ..RunnerOptions::default()
        };
        assert_eq!(run(&file, &first).unwrap(), 0);
        assert_eq!(CHILD_PID.load(Ordering::SeqCst), 0);

        let second = RunnerOptions {
            runner: trap_runner(temp.path()).display().to_string(),
            ..RunnerOptions::default()
        };
        let ready = temp.path().join("demo.ts.ready");
        let signaller = std::thread::spawn(move || {
            for _ in 0..200 {
                if ready.exists() {
                    kill(getpid(), Signal::SIGINT).unwrap();
                    return true;
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            if let Ok(pid) = i32::try_from(CHILD_PID.load(Ordering::SeqCst))
                && pid != 0
            {
                let _ = kill(nix::unistd::Pid::from_raw(pid), Signal::SIGKILL);
            }
            false
        });

        let code = run(&file, &second).unwrap();
        assert!(signaller.join().unwrap(), "runner never became ready");
        assert_eq!(code, 3);
        assert_eq!(CHILD_PID.load(Ordering::SeqCst), 0);
        let seen = fs::read_to_string(temp.path().join("demo.ts.seen")).unwrap();
        assert_eq!(seen.trim(), "INT");
    }
}
