//! Installing the runner dependency through the project's package manager.

use crate::error::PlayError;
use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// Returns the executable name of the package manager.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Detect from the `npm_config_user_agent` value set by package-manager scripts.
    #[must_use]
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.starts_with("pnpm") => PackageManager::Pnpm,
            Some(ua) if ua.starts_with("yarn") => PackageManager::Yarn,
            _ => PackageManager::Npm,
        }
    }

    /// Detect from the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_user_agent(std::env::var("npm_config_user_agent").ok().as_deref())
    }

    /// Arguments that install `package`, as a dev dependency when `dev` is set.
    #[must_use]
    pub fn install_args(self, package: &str, dev: bool) -> Vec<String> {
        let mut args = match self {
            PackageManager::Npm => vec!["install".to_string(), package.to_string()],
            PackageManager::Pnpm | PackageManager::Yarn => {
                vec!["add".to_string(), package.to_string()]
            }
        };
        if dev {
            args.push(
                match self {
                    PackageManager::Npm => "--save-dev",
                    PackageManager::Pnpm | PackageManager::Yarn => "-D",
                }
                .to_string(),
            );
        }
        args
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for [`ensure_package`].
#[derive(Debug, Clone)]
pub struct EnsureOptions {
    pub dev: bool,
    pub manager: PackageManager,
    /// Discard the installer's output.
    pub silent: bool,
}

impl Default for EnsureOptions {
    fn default() -> Self {
        Self {
            dev: true,
            manager: PackageManager::detect(),
            silent: false,
        }
    }
}

/// Look for `node_modules/<package>` in `start` and its ancestors, the way
/// Node resolves packages.
#[must_use]
pub fn find_local_package(package: &str, start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("node_modules").join(package))
        .find(|candidate| candidate.is_dir())
}

/// Whether `package` is resolvable locally or available on `PATH`.
#[must_use]
pub fn is_package_installed(package: &str, start: &Path) -> bool {
    find_local_package(package, start).is_some() || which::which(package).is_ok()
}

/// Install `package` unless it is already available.
///
/// Blocks until the installer exits.
///
/// # Errors
///
/// Returns `Err` if the installer cannot be started or exits unsuccessfully.
pub fn ensure_package(package: &str, start: &Path, options: &EnsureOptions) -> Result<(), PlayError> {
    if is_package_installed(package, start) {
        tracing::debug!("{package} is already installed");
        return Ok(());
    }

    println!(
        "{}{}{}{}{}",
        "⚠️  Dependency ".yellow(),
        format!("\"{package}\"").magenta().bold(),
        " not found, using ".yellow(),
        options.manager.name().cyan().bold(),
        " to install...".yellow()
    );

    let program = which::which(options.manager.name())
        .unwrap_or_else(|_| PathBuf::from(options.manager.name()));
    let mut command = Command::new(program);
    command
        .args(options.manager.install_args(package, options.dev))
        .current_dir(start);
    if options.silent {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = command.status().map_err(|source| PlayError::InstallSpawn {
        package: package.to_string(),
        source,
    })?;

    if !status.success() {
        return Err(PlayError::InstallFailed {
            package: package.to_string(),
            status,
        });
    }

    println!("{}{}", "✅ Installed: ".green().bold(), package.green());
    Ok(())
}
