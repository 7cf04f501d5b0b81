//! Single option tokens and the keys used to detect conflicts between them.
//!
//! A key identifies "the same setting" across different values, so that
//! `-Dfile.encoding=UTF-8` and `-Dfile.encoding=ISO-8859-1` collide while
//! `-Xss1m` and `-Xms512m` do not.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Memory-sizing flags whose value is glued to the flag name (`-Xss1m`).
const SIZED_PREFIXES: [&str; 4] = ["-Xss", "-Xms", "-Xmx", "-Xmn"];

const PROPERTY_PREFIX: &str = "-D";
const ADVANCED_PREFIX: &str = "-XX:";

/// Identity of an option for conflict detection.
///
/// System properties and flags live in separate namespaces: a property named
/// `server` never collides with the `-server` flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum OptionKey {
    /// `-D<name>=<value>` style system property, keyed by `<name>`.
    Property(String),
    /// Any other flag, keyed by its normalized prefix.
    Flag(String),
}

impl OptionKey {
    /// Key of the `-D<name>` system property.
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }

    /// Key of a flag, given its normalized prefix (`-Xss`, `-XX:AlwaysPreTouch`).
    pub fn flag(prefix: impl Into<String>) -> Self {
        Self::Flag(prefix.into())
    }

    /// Derive the key of an already trimmed, validated option token.
    fn derive(text: &str) -> Result<Self, &'static str> {
        if let Some(rest) = text.strip_prefix(PROPERTY_PREFIX) {
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if name.is_empty() {
                return Err("system property name is empty");
            }
            return Ok(Self::Property(name.to_string()));
        }

        if let Some(rest) = text.strip_prefix(ADVANCED_PREFIX) {
            let rest = rest
                .strip_prefix('+')
                .or_else(|| rest.strip_prefix('-'))
                .unwrap_or(rest);
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if name.is_empty() {
                return Err("advanced option name is empty");
            }
            return Ok(Self::Flag(format!("{ADVANCED_PREFIX}{name}")));
        }

        if let Some(prefix) = SIZED_PREFIXES.iter().find(|p| text.starts_with(**p)) {
            return Ok(Self::Flag((*prefix).to_string()));
        }

        let prefix = text.split_once('=').map_or(text, |(prefix, _)| prefix);
        Ok(Self::Flag(prefix.to_string()))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => write!(f, "{PROPERTY_PREFIX}{name}"),
            Self::Flag(prefix) => f.write_str(prefix),
        }
    }
}

/// One option token as it will appear in the generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    raw: String,
    key: OptionKey,
}

impl OptionEntry {
    /// Parse raw option text.
    ///
    /// Surrounding whitespace is ignored. Fails with
    /// [`DomainError::InvalidOption`] when the text is blank, does not start
    /// with `-`, contains inner whitespace, or names an empty property.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DomainError::invalid_option(raw, "option can't be empty"));
        }
        if !text.starts_with('-') {
            return Err(DomainError::invalid_option(raw, "option must start with '-'"));
        }
        if text.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_option(
                raw,
                "option must be a single token without whitespace",
            ));
        }

        let key = OptionKey::derive(text).map_err(|reason| DomainError::invalid_option(raw, reason))?;
        Ok(Self {
            raw: text.to_string(),
            key,
        })
    }

    /// Trimmed option text, exactly as written to the file.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Conflict key derived from the text.
    pub fn key(&self) -> &OptionKey {
        &self.key
    }

    /// Consume the entry, returning its text.
    pub fn into_raw(self) -> String {
        self.raw
    }
}

impl fmt::Display for OptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
