//! Version banner, help text and file listing output.

use crate::config::PlayConfig;
use crate::files::{FileRecord, SCRIPT_EXTENSION};
use crate::flags::{FlagKind, FlagSchema};
use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

/// `PLAY CLI v1.0.0` plus the description, if any.
#[must_use]
pub fn render_version(config: &PlayConfig) -> String {
    let mut banner = format!(
        "{}{}",
        format!("{} CLI ", config.name.to_uppercase()).cyan().bold(),
        format!("v{}", config.version).green().bold()
    );
    if let Some(description) = &config.description {
        let _ = write!(banner, "\n{}", description.yellow());
    }
    banner.push('\n');
    banner
}

fn flag_arg(name: &str, schema: &FlagSchema, used_shorts: &mut HashSet<char>) -> Arg {
    let mut arg = Arg::new(name.to_string()).long(name.to_string());

    if let Some(alias) = schema.alias
        && used_shorts.insert(alias)
    {
        arg = arg.short(alias);
    }

    if matches!(schema.kind, FlagKind::Boolean) {
        // clap never prints defaults for switches.
        let help = match (&schema.description, &schema.default) {
            (Some(description), Some(default)) => Some(format!("{description} [default: {default}]")),
            (Some(description), None) => Some(description.clone()),
            (None, Some(default)) => Some(format!("[default: {default}]")),
            (None, None) => None,
        };
        if let Some(help) = help {
            arg = arg.help(help);
        }
        return arg.action(ArgAction::SetTrue);
    }

    if let Some(description) = &schema.description {
        arg = arg.help(description.clone());
    }

    arg = arg.action(ArgAction::Set);
    if let Some(parameter) = &schema.parameter {
        let value_name = parameter.trim_matches(|c| matches!(c, '<' | '>' | '[' | ']'));
        arg = arg.value_name(value_name.to_string());
    }
    if let Some(default) = &schema.default {
        arg = arg.default_value(default.to_string());
    }
    arg
}

/// clap command describing the launcher, built from the flag registry.
#[must_use]
pub fn help_command(config: &PlayConfig) -> Command {
    let name = config.name.clone();
    let mut command = Command::new(name.clone())
        .version(config.version.clone())
        .before_help(format!("{} CLI ─ v{}", name.to_uppercase(), config.version))
        .override_usage(format!("{name} [options] [value]"))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .after_help(examples(&name));

    if let Some(description) = &config.description {
        command = command.about(description.clone());
    }

    let mut used_shorts = HashSet::new();
    for (flag_name, schema) in config.flags.iter() {
        command = command.arg(flag_arg(flag_name, schema, &mut used_shorts));
    }
    command
}

fn examples(name: &str) -> String {
    let rows = [
        (String::new(), format!("Run default file (index.{SCRIPT_EXTENSION})")),
        ("--file test".to_string(), format!("Run test.{SCRIPT_EXTENSION}")),
        ("--watch -f test".to_string(), format!("Run test.{SCRIPT_EXTENSION} in watch mode")),
        ("--list".to_string(), "List all available files".to_string()),
        ("--version".to_string(), "Show version".to_string()),
        ("--help".to_string(), "Show this help".to_string()),
    ];

    let mut text = String::from("Examples:\n");
    for (args, what) in rows {
        let invocation = if args.is_empty() {
            name.to_string()
        } else {
            format!("{name} {args}")
        };
        let _ = writeln!(text, "  {invocation:<24} → {what}");
    }
    text
}

/// Full help text.
#[must_use]
pub fn render_help(config: &PlayConfig) -> String {
    help_command(config).render_help().to_string()
}

/// Listing of `files` under `root_label`, grouped by directory.
#[must_use]
pub fn render_file_list(root_label: &Path, files: &[FileRecord]) -> String {
    let root = root_label.display().to_string();

    if files.is_empty() {
        return format!(
            "\n{}{}{}\n",
            format!("❌ No .{SCRIPT_EXTENSION} files found in ").red().bold(),
            root.cyan(),
            " directory".red().bold()
        );
    }

    let mut out = format!(
        "\n{} {} {}\n\n",
        "📁 Available files:".cyan().bold(),
        root.blue(),
        format!("({} total)", files.len()).dimmed()
    );

    // Files arrive sorted by path, so each directory forms one contiguous run.
    let mut groups: Vec<(String, Vec<&FileRecord>)> = Vec::new();
    for file in files {
        let dir = match file.relative_path.rsplit_once('/') {
            Some((dir, _)) => format!("📁 {dir}"),
            None => "📄 Root directory".to_string(),
        };
        match groups.iter_mut().find(|(d, _)| *d == dir) {
            Some((_, members)) => members.push(file),
            None => groups.push((dir, vec![file])),
        }
    }

    let mut index = 1;
    for (dir, members) in groups {
        let _ = writeln!(out, "{}", format!("{dir}:").magenta().bold());
        for file in members {
            let _ = writeln!(
                out,
                "  {}. {}",
                format!("{index:>2}").dimmed(),
                file.name.cyan()
            );
            index += 1;
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plain_config() -> PlayConfig {
        colored::control::set_override(false);
        PlayConfig::default()
    }

    fn record(relative: &str) -> FileRecord {
        let file_name = relative.rsplit('/').next().unwrap();
        FileRecord {
            name: file_name.trim_end_matches(".ts").to_string(),
            path: PathBuf::from("/root").join(relative),
            relative_path: relative.to_string(),
        }
    }

    #[test]
    fn test_render_version() {
        let banner = render_version(&plain_config());
        assert!(banner.contains("PLAY CLI"));
        assert!(banner.contains(&format!("v{}", env!("CARGO_PKG_VERSION"))));
        assert!(banner.contains("Run TypeScript playground files with tsx"));
    }

    #[test]
    fn test_render_help_lists_every_flag() {
        let help = render_help(&plain_config());
        for (long, short) in [
            ("--version", "-v"),
            ("--help", "-h"),
            ("--file", "-f"),
            ("--list", "-l"),
            ("--watch", "-w"),
            ("--tsconfig", "-t"),
            ("--debug", "-d"),
        ] {
            assert!(help.contains(long), "missing {long} in\n{help}");
            assert!(help.contains(&format!("{short}, {long}")), "missing {short} in\n{help}");
        }
        assert!(help.contains("play [options] [value]"));
        assert!(help.contains("[default: index]"));
        assert!(help.contains("Enable watch mode [default: false]"));
        assert!(help.contains("List all available files [default: false]"));
        assert!(!help.contains("Show version [default"));
        assert!(help.contains("Examples:"));
    }

    #[test]
    fn test_help_command_tolerates_duplicate_aliases() {
        let mut config = plain_config();
        let mut extra = crate::flags::FlagRegistry::new();
        extra.insert(
            "force",
            FlagSchema::new(FlagKind::Boolean).alias('f'),
        );
        config = config.with_flags(&extra);
        let help = render_help(&config);
        assert!(help.contains("--force"));
    }

    #[test]
    fn test_render_file_list_groups_by_directory() {
        colored::control::set_override(false);
        let files = vec![record("a.ts"), record("b.ts"), record("utils/c.ts")];
        let out = render_file_list(Path::new("playground"), &files);

        assert!(out.contains("Available files: playground (3 total)"));
        assert!(out.contains("📄 Root directory:"));
        assert!(out.contains("📁 utils:"));
        assert!(out.contains(" 1. a"));
        assert!(out.contains(" 3. c"));
        let root_pos = out.find("Root directory").unwrap();
        let utils_pos = out.find("utils:").unwrap();
        assert!(root_pos < utils_pos);
    }

    #[test]
    fn test_render_empty_file_list() {
        colored::control::set_override(false);
        let out = render_file_list(Path::new("playground"), &[]);
        assert!(out.contains("No .ts files found in playground directory"));
    }
}
