//! Command-line argument parsing against a flag registry.
//!
//! Parsing runs in three stages:
//! 1. [`special`] pulls reserved flags (`--watch`, `--version`) out of the argument vector.
//! 2. [`generic`] parses what is left with a non-strict option parser.
//! 3. [`coerce`] turns each raw value into the type declared by its flag.
//!
//! A failure in stage 2 is logged and treated as "nothing parsed"; defaults
//! still apply.

pub mod coerce;
pub mod error;
pub mod generic;
pub mod special;

pub use coerce::parse_flag_value;
pub use error::ArgParseError;

use crate::flags::{FlagRegistry, FlagValue, RawValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;

/// Coerced flag values keyed by canonical flag name, plus positionals.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ParsedArguments {
    #[serde(flatten)]
    pub values: BTreeMap<String, FlagValue>,
    #[serde(rename = "_")]
    pub positionals: Vec<String>,
}

impl ParsedArguments {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    /// `true` only when the flag is set to boolean true.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(FlagValue::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlagValue::as_str)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FlagValue::as_number)
    }
}

/// Parse `argv` (program name already stripped) against `registry`.
pub fn parse_arguments<I, T>(argv: I, registry: &FlagRegistry) -> ParsedArguments
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

    let literals = special::special_literals(registry);
    let split = special::separate_args(&argv, &literals, registry);

    let mut raw = generic::RawParse::default();
    if !split.remaining.is_empty() {
        let options = generic::OptionTable::from_registry(registry, &literals);
        match generic::parse_tokens(&split.remaining, &options) {
            Ok(parsed) => raw = parsed,
            Err(e) => tracing::error!("Error parsing arguments: {e}"),
        }
    }

    let mut merged: BTreeMap<String, RawValue> = split.special;
    for (name, value) in raw.values {
        if registry.contains(&name) {
            merged.insert(name, value);
        } else {
            tracing::debug!("ignoring unknown flag --{name}");
        }
    }

    let mut args = ParsedArguments {
        values: BTreeMap::new(),
        positionals: raw.positionals,
    };

    for (name, schema) in registry.iter() {
        if let Some(value) = parse_flag_value(schema, merged.get(name)) {
            args.values.insert(name.to_string(), value);
        }
    }

    args
}
