//! Non-strict option parser for everything the reserved-flag splitter leaves behind.
//!
//! Behaves like Node's `util.parseArgs` with `strict: false` and positionals
//! allowed: unknown options are recorded rather than rejected, and a
//! value-taking option consumes the next token whatever it looks like.

use super::error::ArgParseError;
use crate::flags::{FlagRegistry, RawValue};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::ffi::OsString;

/// Option table derived from the registry for the generic parsing stage.
#[derive(Debug, Default)]
pub struct OptionTable {
    takes_value: HashMap<String, bool>,
    shorts: HashMap<char, String>,
}

impl OptionTable {
    /// Build the table from every registry flag not already handled as special.
    #[must_use]
    pub fn from_registry(registry: &FlagRegistry, special_literals: &HashSet<String>) -> Self {
        let mut table = Self::default();
        for (name, schema) in registry.iter() {
            let is_special = special_literals.contains(&format!("--{name}"))
                || schema
                    .alias
                    .is_some_and(|alias| special_literals.contains(&format!("-{alias}")));
            if is_special {
                continue;
            }

            table
                .takes_value
                .insert(name.to_string(), schema.kind.takes_value());
            if let Some(alias) = schema.alias {
                table.shorts.insert(alias, name.to_string());
            }
        }
        table
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.takes_value.contains_key(name)
    }

    fn takes_value(&self, name: &str) -> bool {
        self.takes_value.get(name).copied().unwrap_or(false)
    }

    fn long_name(&self, short: char) -> String {
        self.shorts
            .get(&short)
            .cloned()
            .unwrap_or_else(|| short.to_string())
    }
}

/// Raw (uncoerced) values and positionals.
#[derive(Debug, Default, PartialEq)]
pub struct RawParse {
    pub values: BTreeMap<String, RawValue>,
    pub positionals: Vec<String>,
}

/// Parse `tokens` against `options`.
///
/// # Errors
///
/// Returns `Err` if a token is not valid unicode.
pub fn parse_tokens(tokens: &[OsString], options: &OptionTable) -> Result<RawParse, ArgParseError> {
    let mut queue = tokens
        .iter()
        .map(|token| {
            token
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| ArgParseError::InvalidUnicode(token.clone()))
        })
        .collect::<Result<VecDeque<String>, _>>()?;

    let mut parsed = RawParse::default();

    while let Some(arg) = queue.pop_front() {
        if arg == "--" {
            parsed.positionals.extend(queue.drain(..));
            break;
        }

        if let Some(body) = short_body(&arg) {
            let mut chars = body.chars();
            let Some(first) = chars.next() else {
                parsed.positionals.push(arg);
                continue;
            };
            let name = options.long_name(first);
            let rest = chars.as_str();

            if rest.is_empty() {
                // -f [value]
                let value = take_value(&mut queue, options.takes_value(&name));
                parsed.values.insert(name, value);
            } else if options.takes_value(&name) {
                // -fvalue
                parsed.values.insert(name, RawValue::Text(rest.to_string()));
            } else {
                // -abc
                for expanded in expand_short_group(body, options).into_iter().rev() {
                    queue.push_front(expanded);
                }
            }
            continue;
        }

        if let Some(body) = arg.strip_prefix("--").filter(|b| !b.is_empty()) {
            // An `=` in the first position belongs to the name itself.
            match body.char_indices().skip(1).find(|(_, c)| *c == '=') {
                Some((eq, _)) => {
                    parsed.values.insert(
                        body[..eq].to_string(),
                        RawValue::Text(body[eq + 1..].to_string()),
                    );
                }
                None => {
                    let name = body.to_string();
                    let value = take_value(&mut queue, options.takes_value(&name));
                    parsed.values.insert(name, value);
                }
            }
            continue;
        }

        parsed.positionals.push(arg);
    }

    Ok(parsed)
}

/// Body of a single-dash token (`-abc` → `abc`); `None` for `-`, `--x` and non-options.
fn short_body(arg: &str) -> Option<&str> {
    let body = arg.strip_prefix('-')?;
    if body.is_empty() || body.starts_with('-') {
        None
    } else {
        Some(body)
    }
}

fn take_value(queue: &mut VecDeque<String>, takes_value: bool) -> RawValue {
    if takes_value && let Some(next) = queue.pop_front() {
        return RawValue::Text(next);
    }
    RawValue::Flag
}

/// `-abc` → `-a -b -c`; a value-taking letter swallows the rest: `-afx` → `-a -f x`.
fn expand_short_group(body: &str, options: &OptionTable) -> Vec<String> {
    let mut expanded = Vec::new();
    for (idx, ch) in body.char_indices() {
        expanded.push(format!("-{ch}"));
        let rest = &body[idx + ch.len_utf8()..];
        if options.takes_value(&options.long_name(ch)) && !rest.is_empty() {
            expanded.push(rest.to_string());
            break;
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::special::special_literals;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn parse(args: &[&str]) -> RawParse {
        let registry = FlagRegistry::builtin();
        let options = OptionTable::from_registry(&registry, &special_literals(&registry));
        parse_tokens(&os(args), &options).unwrap()
    }

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_option_table_excludes_special_flags() {
        let registry = FlagRegistry::builtin();
        let options = OptionTable::from_registry(&registry, &special_literals(&registry));
        assert!(!options.contains("watch"));
        assert!(!options.contains("version"));
        assert!(options.contains("file"));
        assert!(options.contains("help"));
    }

    #[test]
    fn test_long_option_with_separate_value() {
        let parsed = parse(&["--file", "demo"]);
        assert_eq!(parsed.values.get("file"), Some(&text("demo")));
        assert!(parsed.positionals.is_empty());
    }

    #[test]
    fn test_long_option_with_inline_value() {
        let parsed = parse(&["--file=demo", "--list=yes"]);
        assert_eq!(parsed.values.get("file"), Some(&text("demo")));
        assert_eq!(parsed.values.get("list"), Some(&text("yes")));
    }

    #[test]
    fn test_short_option_and_positional() {
        let parsed = parse(&["-f", "demo", "extra"]);
        assert_eq!(parsed.values.get("file"), Some(&text("demo")));
        assert_eq!(parsed.positionals, ["extra"]);
    }

    #[test]
    fn test_short_option_with_attached_value() {
        let parsed = parse(&["-fdemo"]);
        assert_eq!(parsed.values.get("file"), Some(&text("demo")));
    }

    #[test]
    fn test_short_group_expands() {
        let parsed = parse(&["-ld"]);
        assert_eq!(parsed.values.get("list"), Some(&RawValue::Flag));
        assert_eq!(parsed.values.get("debug"), Some(&RawValue::Flag));
    }

    #[test]
    fn test_short_group_with_trailing_value() {
        let parsed = parse(&["-ldfdemo"]);
        assert_eq!(parsed.values.get("list"), Some(&RawValue::Flag));
        assert_eq!(parsed.values.get("debug"), Some(&RawValue::Flag));
        assert_eq!(parsed.values.get("file"), Some(&text("demo")));
    }

    #[test]
    fn test_value_option_consumes_dash_prefixed_token() {
        let parsed = parse(&["--file", "--debug"]);
        assert_eq!(parsed.values.get("file"), Some(&text("--debug")));
        assert!(!parsed.values.contains_key("debug"));
    }

    #[test]
    fn test_value_option_at_end_is_bare() {
        let parsed = parse(&["--file"]);
        assert_eq!(parsed.values.get("file"), Some(&RawValue::Flag));
    }

    #[test]
    fn test_double_dash_ends_options() {
        let parsed = parse(&["--list", "--", "--file", "x"]);
        assert_eq!(parsed.values.get("list"), Some(&RawValue::Flag));
        assert_eq!(parsed.positionals, ["--file", "x"]);
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let parsed = parse(&["-"]);
        assert_eq!(parsed.positionals, ["-"]);
    }

    #[test]
    fn test_unknown_options_are_recorded_not_rejected() {
        let parsed = parse(&["--bogus", "value", "-z"]);
        assert_eq!(parsed.values.get("bogus"), Some(&RawValue::Flag));
        assert_eq!(parsed.values.get("z"), Some(&RawValue::Flag));
        assert_eq!(parsed.positionals, ["value"]);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let parsed = parse(&["-f", "one", "--file", "two"]);
        assert_eq!(parsed.values.get("file"), Some(&text("two")));
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_unicode_is_an_error() {
        use std::os::unix::ffi::OsStringExt;

        let registry = FlagRegistry::builtin();
        let options = OptionTable::from_registry(&registry, &special_literals(&registry));
        let tokens = vec![OsString::from_vec(vec![0x66, 0x6f, 0x80])];
        assert!(matches!(
            parse_tokens(&tokens, &options),
            Err(ArgParseError::InvalidUnicode(_))
        ));
    }
}
