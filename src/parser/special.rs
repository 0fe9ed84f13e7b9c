//! Pulls reserved flags out of the argument vector before generic parsing.
//!
//! The host runtime interprets a handful of flag names on its own (`--watch`,
//! `--version`). Those tokens are resolved here and removed, so the generic
//! parser never sees them.

use crate::flags::{FlagRegistry, RawValue};
use std::collections::{BTreeMap, HashSet};
use std::ffi::{OsStr, OsString};

/// Flag names the host runtime would otherwise intercept.
pub const RESERVED_NAMES: [&str; 2] = ["watch", "version"];

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Result of splitting reserved flags from everything else.
#[derive(Debug, Default, PartialEq)]
pub struct Split {
    pub special: BTreeMap<String, RawValue>,
    pub remaining: Vec<OsString>,
}

/// Literal tokens (`--name`, `-alias`) that belong to reserved flags in `registry`.
#[must_use]
pub fn special_literals(registry: &FlagRegistry) -> HashSet<String> {
    let mut literals = HashSet::new();
    for (name, schema) in registry.iter() {
        if is_reserved(name) {
            literals.insert(format!("--{name}"));
            if let Some(alias) = schema.alias {
                literals.insert(format!("-{alias}"));
            }
        }
    }
    literals
}

/// Separate reserved-flag tokens from the rest, preserving the order of the rest.
pub fn separate_args(
    argv: &[OsString],
    literals: &HashSet<String>,
    registry: &FlagRegistry,
) -> Split {
    let mut split = Split::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = &argv[i];
        let Some(literal) = arg.to_str().filter(|a| literals.contains(*a)) else {
            split.remaining.push(arg.clone());
            i += 1;
            continue;
        };

        let name = canonical_name(literal, registry);
        match argv.get(i + 1).and_then(|next| value_token(next)) {
            Some(value) => {
                split.special.insert(name, RawValue::Text(value.to_string()));
                i += 2;
            }
            None => {
                split.special.insert(name, RawValue::Flag);
                i += 1;
            }
        }
    }

    split
}

fn canonical_name(literal: &str, registry: &FlagRegistry) -> String {
    let raw_key = literal.trim_start_matches('-');
    if is_reserved(raw_key) {
        return raw_key.to_string();
    }

    let mut chars = raw_key.chars();
    match (chars.next(), chars.next()) {
        (Some(alias), None) => registry
            .name_for_alias(alias)
            .unwrap_or(raw_key)
            .to_string(),
        _ => raw_key.to_string(),
    }
}

/// A following token is only taken as a value when it cannot be a flag itself.
fn value_token(next: &OsStr) -> Option<&str> {
    next.to_str()
        .filter(|value| !value.is_empty() && !value.starts_with('-'))
}
