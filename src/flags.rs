//! Flag schema definitions and the flag registry.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Coercion function for flags with a custom kind.
pub type CoerceFn =
    Arc<dyn Fn(&RawValue) -> Result<FlagValue, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// Declared type of a flag.
#[derive(Clone)]
pub enum FlagKind {
    String,
    Number,
    Boolean,
    Custom(CoerceFn),
}

impl FlagKind {
    /// Wrap a coercion closure as a custom kind.
    pub fn custom<F>(coerce: F) -> Self
    where
        F: Fn(&RawValue) -> Result<FlagValue, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        FlagKind::Custom(Arc::new(coerce))
    }

    /// Whether the flag consumes a value token (everything except booleans).
    #[must_use]
    pub fn takes_value(&self) -> bool {
        !matches!(self, FlagKind::Boolean)
    }
}

impl fmt::Debug for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::String => f.write_str("String"),
            FlagKind::Number => f.write_str("Number"),
            FlagKind::Boolean => f.write_str("Boolean"),
            FlagKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A value as it comes off the command line, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Bare flag with no value attached.
    Flag,
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Flag => f.write_str("true"),
            RawValue::Text(text) => f.write_str(text),
        }
    }
}

/// A coerced flag value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
    Number(f64),
    Json(serde_json::Value),
}

impl FlagValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Json(serde_json::Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Str(s) => Some(s),
            FlagValue::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FlagValue::Number(n) => Some(*n),
            FlagValue::Json(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Str(s) => f.write_str(s),
            FlagValue::Number(n) => write!(f, "{n}"),
            FlagValue::Json(value) => write!(f, "{value}"),
        }
    }
}

/// Everything known about a single flag.
#[derive(Debug, Clone)]
pub struct FlagSchema {
    pub kind: FlagKind,
    pub alias: Option<char>,
    pub default: Option<FlagValue>,
    pub description: Option<String>,
    /// Value placeholder shown in help output, e.g. `<name>`.
    pub parameter: Option<String>,
}

impl FlagSchema {
    #[must_use]
    pub fn new(kind: FlagKind) -> Self {
        Self {
            kind,
            alias: None,
            default: None,
            description: None,
            parameter: None,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: FlagValue) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }
}

/// Insertion-ordered map from flag name to schema.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    entries: Vec<(String, FlagSchema)>,
}

impl FlagRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The flags every launcher understands.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "version",
            FlagSchema::new(FlagKind::Boolean)
                .alias('v')
                .description("Show version"),
        );
        registry.insert(
            "help",
            FlagSchema::new(FlagKind::Boolean)
                .alias('h')
                .description("Show help"),
        );
        registry.insert(
            "file",
            FlagSchema::new(FlagKind::String)
                .alias('f')
                .default_value(FlagValue::Str("index".to_string()))
                .description("File to run (.ts extension optional)")
                .parameter("<name>"),
        );
        registry.insert(
            "list",
            FlagSchema::new(FlagKind::Boolean)
                .alias('l')
                .default_value(FlagValue::Bool(false))
                .description("List all available files"),
        );
        registry.insert(
            "watch",
            FlagSchema::new(FlagKind::Boolean)
                .alias('w')
                .default_value(FlagValue::Bool(false))
                .description("Enable watch mode"),
        );
        registry.insert(
            "tsconfig",
            FlagSchema::new(FlagKind::String)
                .alias('t')
                .description("Path to tsconfig.json")
                .parameter("<path>"),
        );
        registry.insert(
            "debug",
            FlagSchema::new(FlagKind::Boolean)
                .alias('d')
                .default_value(FlagValue::Bool(false))
                .description("Print execution details before running"),
        );
        registry
    }

    /// Insert a flag, replacing any existing schema with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, schema: FlagSchema) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = schema;
        } else {
            self.entries.push((name, schema));
        }
    }

    /// Merge `overrides` on top of `self`. Same-named entries are replaced wholesale.
    #[must_use]
    pub fn merged_with(mut self, overrides: &FlagRegistry) -> Self {
        for (name, schema) in overrides.iter() {
            self.insert(name, schema.clone());
        }
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagSchema> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, schema)| schema)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Canonical name of the flag whose alias is `alias`, if any.
    #[must_use]
    pub fn name_for_alias(&self, alias: char) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, schema)| schema.alias == Some(alias))
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagSchema)> {
        self.entries.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
