//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Helper to get the compiled binary path
pub fn get_binary_path() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_play") {
        return PathBuf::from(path);
    }

    let mut path = env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("play");

    if !path.exists() {
        let build_output = Command::new("cargo")
            .args(["build", "--bin", "play"])
            .output()
            .expect("Failed to build binary");

        assert!(
            build_output.status.success(),
            "Failed to build play binary: {}",
            String::from_utf8_lossy(&build_output.stderr)
        );
    }

    path
}

/// Helper to create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Write `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Package version for testing --version flag
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper to create a Command with test environment.
/// Runs inside `dir` with `HOME` pointed at it so no outer `play.json` is
/// picked up, and clears every `PLAY_*` variable plus colors.
pub fn test_command(binary: &Path, dir: &Path) -> Command {
    let mut cmd = Command::new(binary);
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("PLAY_ROOT_DIR")
        .env_remove("PLAY_TSCONFIG")
        .env_remove("PLAY_AUTO_INSTALL")
        .env_remove("PLAY_RUNNER")
        .env_remove("PLAY_LOG");
    cmd
}

/// Write an executable runner script that records the first INT/TERM it
/// receives in `<file>.seen` (exiting 3/4) and touches `<file>.ready` once
/// its traps are set.
#[cfg(unix)]
pub fn write_trap_runner(dir: &Path) -> PathBuf {
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

/// Poll for `path` for up to five seconds.
pub fn wait_for_file(path: &Path) -> bool {
    for _ in 0..200 {
        if path.exists() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(25));
    }
    false
}
