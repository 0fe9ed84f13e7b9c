//! Orchestration: parse arguments, then show version/help/listing or run a file.

use crate::config::PlayConfig;
use crate::display;
use crate::error::PlayError;
use crate::files::{FileLister, SCRIPT_EXTENSION};
use crate::parser::{ParsedArguments, parse_arguments};
use crate::runner::{self, RunnerOptions};
use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// File run when `--file` is not given.
pub const DEFAULT_FILE: &str = "index";

/// Target script path. The extension is appended when missing; relative names
/// resolve against the root directory if one is configured, else against `cwd`.
#[must_use]
pub fn resolve_file_path(file: &str, root_dir: Option<&Path>, cwd: &Path) -> PathBuf {
    let file_name = if file.ends_with(&format!(".{SCRIPT_EXTENSION}")) {
        file.to_string()
    } else {
        format!("{file}.{SCRIPT_EXTENSION}")
    };

    match root_dir {
        Some(root) => cwd.join(root).join(file_name),
        None => cwd.join(file_name),
    }
}

/// Type-config path, in order of preference: the `--tsconfig` argument, the
/// configured path, `tsconfig.json` in `cwd`. `None` lets the runner decide.
#[must_use]
pub fn resolve_tsconfig_path(
    tsconfig_arg: Option<&str>,
    configured: Option<&Path>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(arg) = tsconfig_arg {
        let path = cwd.join(arg);
        if path.exists() {
            return Some(path);
        }
        eprintln!(
            "{}{}",
            "⚠️  tsconfig not found: ".yellow(),
            path.display().to_string().cyan().bold()
        );
    }

    if let Some(configured) = configured {
        let path = cwd.join(configured);
        if path.exists() {
            return Some(path);
        }
    }

    let root_config = cwd.join("tsconfig.json");
    root_config.exists().then_some(root_config)
}

fn print_file_list(lister: &mut FileLister, root_dir: &Path) {
    // --list always shows the current state of the directory.
    let files = lister.list(root_dir, false);
    print!("{}", display::render_file_list(root_dir, &files));
}

fn report(error: &PlayError) {
    eprintln!("{}{}", "❌ ".red().bold(), error.to_string().red());

    if error.is_runner_missing() {
        println!("{}", "\n💡 tsx is not installed. Install via:".yellow().bold());
        println!("{}", "   npm install -D tsx".green());
        println!("{}", "   pnpm add -D tsx".green());
        println!("{}", "   yarn add -D tsx".green());
    }
}

fn runner_options(config: &PlayConfig, args: &ParsedArguments, tsconfig_path: Option<PathBuf>) -> RunnerOptions {
    RunnerOptions {
        runner: config.runner.clone(),
        watch: args.flag("watch"),
        tsconfig_path,
        auto_install: config.auto_install,
        debug: args.flag("debug"),
    }
}

/// Run the launcher against `argv` (program name already stripped) and
/// return the process exit code.
pub fn play<I, T>(config: &PlayConfig, argv: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    config.validate();

    let args = parse_arguments(argv, &config.flags);
    let mut lister = FileLister::new();

    if args.flag("version") {
        println!("{}", display::render_version(config));
        return 0;
    }

    if args.flag("help") {
        println!("{}", display::render_help(config));
        return 0;
    }

    if args.flag("list") {
        match &config.root_dir {
            Some(root_dir) => print_file_list(&mut lister, root_dir),
            None => println!("{}", "❌ No root directory configured".red().bold()),
        }
        return 0;
    }

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("{}{}", "❌ Cannot determine current directory: ".red().bold(), e);
            return 1;
        }
    };

    let file = args
        .string("file")
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FILE);
    let file_path = resolve_file_path(file, config.root_dir.as_deref(), &cwd);
    let tsconfig_path =
        resolve_tsconfig_path(args.string("tsconfig"), config.tsconfig.as_deref(), &cwd);

    if !file_path.exists() {
        report(&PlayError::FileNotFound(file_path));
        if let Some(root_dir) = &config.root_dir {
            println!();
            print_file_list(&mut lister, root_dir);
            println!("{}Use --help to view options", "\n💡 Tip: ".yellow().bold());
        }
        return 1;
    }

    let options = runner_options(config, &args, tsconfig_path);
    if options.debug {
        match serde_json::to_string(&args) {
            Ok(json) => println!("{} {}", "🔍 Arguments:".blue().bold(), json),
            Err(e) => tracing::debug!("cannot serialize arguments: {e}"),
        }
    }

    match runner::run(&file_path, &options) {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            1
        }
    }
}
