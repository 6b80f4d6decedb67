//! Caller-supplied parameters and their validated form.
//!
//! [`RawParameters`] is whatever a front end collected (flags, a config file,
//! an HTTP form). [`ParameterSet::validate`] is the only way to obtain a
//! [`ParameterSet`], so holding one proves every rule below has been checked:
//!
//! | Field           | Rule                                                        |
//! |-----------------|-------------------------------------------------------------|
//! | `PluginName`    | present, `[A-Za-z0-9_-]+`, starts with a letter             |
//! | `PluginNameCap` | derived from `PluginName`; input value ignored              |
//! | `ModulePath`    | present, non-empty `/`-separated segments, no whitespace    |
//! | `AuthorName`    | optional                                                    |
//! | `AuthorEmail`   | optional                                                    |
//! | `Description`   | optional                                                    |
//!
//! No value may contain `{{` or `}}`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{error::DomainError, value_objects::ParamField};

/// Unvalidated name/value pairs as supplied by a front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParameters {
    values: BTreeMap<String, String>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, consuming self and returning the updated mapping.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = Self::new();
        for (k, v) in iter {
            raw.insert(k, v);
        }
        raw
    }
}

/// Validated, immutable parameter bindings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSet {
    plugin_name: String,
    plugin_name_cap: String,
    module_path: String,
    author_name: String,
    author_email: String,
    description: String,
}

impl ParameterSet {
    /// Validate a raw mapping.
    ///
    /// # Errors
    ///
    /// - `UnknownParameter` for a name outside the declared field set
    /// - `MissingParameter` when `PluginName` or `ModulePath` is absent or blank
    /// - `InvalidParameter` when a value breaks its field's rule
    pub fn validate(raw: &RawParameters) -> Result<Self, DomainError> {
        for (name, value) in raw.iter() {
            let field: ParamField = name.parse()?;
            if value.contains("{{") || value.contains("}}") {
                return Err(DomainError::InvalidParameter {
                    field: field.as_str(),
                    reason: "value must not contain '{{' or '}}'".into(),
                });
            }
        }

        let plugin_name = required(raw, ParamField::PluginName)?;
        validate_plugin_name(plugin_name)?;

        let module_path = required(raw, ParamField::ModulePath)?;
        validate_module_path(module_path)?;

        let plugin_name_cap = capitalize(plugin_name);
        if let Some(supplied) = raw.get(ParamField::PluginNameCap.as_str()) {
            if supplied != plugin_name_cap {
                debug!(
                    supplied,
                    derived = %plugin_name_cap,
                    "ignoring supplied PluginNameCap"
                );
            }
        }

        Ok(Self {
            plugin_name: plugin_name.to_string(),
            plugin_name_cap,
            module_path: module_path.to_string(),
            author_name: optional(raw, ParamField::AuthorName),
            author_email: optional(raw, ParamField::AuthorEmail),
            description: optional(raw, ParamField::Description),
        })
    }

    /// Value bound to `field`. Optional fields that were not supplied are
    /// empty strings; fallbacks are applied by the template, not here.
    pub fn get(&self, field: ParamField) -> &str {
        match field {
            ParamField::PluginName => &self.plugin_name,
            ParamField::PluginNameCap => &self.plugin_name_cap,
            ParamField::ModulePath => &self.module_path,
            ParamField::AuthorName => &self.author_name,
            ParamField::AuthorEmail => &self.author_email,
            ParamField::Description => &self.description,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn plugin_name_cap(&self) -> &str {
        &self.plugin_name_cap
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }
}

fn required<'a>(raw: &'a RawParameters, field: ParamField) -> Result<&'a str, DomainError> {
    match raw.get(field.as_str()).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::MissingParameter {
            field: field.as_str(),
        }),
    }
}

fn optional(raw: &RawParameters, field: ParamField) -> String {
    raw.get(field.as_str())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn validate_plugin_name(name: &str) -> Result<(), DomainError> {
    let invalid = |reason: String| DomainError::InvalidParameter {
        field: ParamField::PluginName.as_str(),
        reason,
    };

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(format!("'{bad}' is not allowed")));
    }

    match name.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => Ok(()),
        Some(first) => Err(invalid(format!("must start with a letter, not '{first}'"))),
        None => Err(invalid("must not be empty".into())),
    }
}

fn validate_module_path(path: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidParameter {
        field: ParamField::ModulePath.as_str(),
        reason: reason.to_string(),
    };

    if path.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(invalid("must not start or end with '/'"));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(invalid("contains an empty segment"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid("must not contain '.' or '..' segments"));
        }
    }
    Ok(())
}

/// First character upper-cased, remainder unchanged.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}
