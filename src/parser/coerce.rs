//! Raw value → typed flag value.

use crate::flags::{FlagKind, FlagSchema, FlagValue, RawValue};

/// Coerce `raw` into the kind declared by `schema`.
///
/// An absent value yields the schema default. A number that does not parse,
/// or a custom coercion that fails, also falls back to the default.
#[must_use]
pub fn parse_flag_value(schema: &FlagSchema, raw: Option<&RawValue>) -> Option<FlagValue> {
    match raw {
        None => schema.default.clone(),
        Some(raw) => coerce(schema, raw),
    }
}

fn coerce(schema: &FlagSchema, raw: &RawValue) -> Option<FlagValue> {
    match &schema.kind {
        FlagKind::Boolean => Some(FlagValue::Bool(match raw {
            RawValue::Flag => true,
            RawValue::Text(text) => text == "true",
        })),
        FlagKind::String => Some(FlagValue::Str(raw.to_string())),
        FlagKind::Number => match to_number(raw) {
            Some(n) => Some(FlagValue::Number(n)),
            None => schema.default.clone(),
        },
        FlagKind::Custom(coerce_fn) => match coerce_fn(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to parse value {raw}: {e}");
                schema.default.clone()
            }
        },
    }
}

/// Numeric conversion with JavaScript `Number()` semantics; `None` stands for NaN.
#[allow(clippy::cast_precision_loss)]
fn to_number(raw: &RawValue) -> Option<f64> {
    let text = match raw {
        RawValue::Flag => return Some(1.0),
        RawValue::Text(text) => text.trim(),
    };

    if text.is_empty() {
        return Some(0.0);
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix).ok().map(|n| n as f64);
    }

    // At most one sign: `--1` and `+-Infinity` are NaN.
    match text.strip_prefix(['+', '-']).unwrap_or(text) {
        "Infinity" => {
            return Some(if text.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
        // Rust accepts these spellings, JavaScript does not.
        s if s.eq_ignore_ascii_case("inf")
            || s.eq_ignore_ascii_case("infinity")
            || s.eq_ignore_ascii_case("nan") =>
        {
            return None;
        }
        _ => {}
    }

    text.parse::<f64>().ok().filter(|n| !n.is_nan())
}
