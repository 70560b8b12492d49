//! Component-based version model and the parse/serialize spec.
//!
//! A version is an ordered list of named numeric components (major, minor,
//! patch by default, but entirely configuration-driven). The ordering comes
//! from the [`VersionSpec`], not the type: bumping one component resets
//! every lower-precedence component to zero.
//!
//! Parsing uses a regex with named capture groups; serializing renders a
//! template like `{major}.{minor}.{patch}` against the component values.

use std::fmt;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::context::RenderContext;

/// Errors from version parsing and computation.
#[derive(Error, Debug)]
pub enum VersionError {
    /// The configured parse pattern is not a valid regular expression.
    #[error("invalid parse pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: Box<regex::Error>,
    },

    /// The version string did not match the parse pattern.
    #[error("version {text:?} does not match parse pattern {pattern:?}")]
    Unparseable {
        /// The text that failed to parse.
        text: String,
        /// The pattern it was matched against.
        pattern: String,
    },

    /// A captured component value was not a number.
    #[error("version component {part:?} has non-numeric value {value:?}")]
    NonNumeric {
        /// The component name.
        part: String,
        /// The captured value.
        value: String,
    },

    /// The requested component is not in the configured ordering.
    #[error("unknown version component {part:?} (configured components: {known})")]
    UnknownPart {
        /// The requested component name.
        part: String,
        /// The configured component names, comma separated.
        known: String,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// An immutable set of named version components in configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    values: Vec<(String, u64)>,
}

impl Version {
    /// Build a version from `(component, value)` pairs, kept in the given
    /// order.
    pub fn new(values: Vec<(String, u64)>) -> Self {
        Self { values }
    }

    /// The value of a named component, if present.
    pub fn get(&self, part: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|(name, _)| name == part)
            .map(|&(_, value)| value)
    }

    /// Iterate over `(component, value)` pairs in order.
    pub fn components(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Produce a new version with `part` incremented and every
    /// lower-precedence component reset to zero.
    ///
    /// `order` is the component ordering from configuration, highest
    /// precedence first. Fails if `part` is not in `order`.
    pub fn bump(&self, part: &str, order: &[String]) -> VersionResult<Self> {
        let bumped = order
            .iter()
            .position(|name| name == part)
            .ok_or_else(|| VersionError::UnknownPart {
                part: part.to_string(),
                known: order.join(", "),
            })?;

        let values = self
            .values
            .iter()
            .map(|(name, value)| {
                let next = match order.iter().position(|n| n == name) {
                    Some(index) if index == bumped => value + 1,
                    Some(index) if index > bumped => 0,
                    _ => *value,
                };
                (name.clone(), next)
            })
            .collect();

        Ok(Self { values })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// How version strings are turned into [`Version`]s and back.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    order: Vec<String>,
    pattern: Regex,
    serialize_fmt: String,
}

impl VersionSpec {
    /// Compile a spec from a parse pattern, a serialize template and the
    /// component ordering.
    pub fn new(parse: &str, serialize: &str, order: &[String]) -> VersionResult<Self> {
        let pattern = Regex::new(parse).map_err(|source| VersionError::InvalidPattern {
            pattern: parse.to_string(),
            source: Box::new(source),
        })?;
        Ok(Self {
            order: order.to_vec(),
            pattern,
            serialize_fmt: serialize.to_string(),
        })
    }

    /// The component ordering, highest precedence first.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// A copy of this spec with a different serialize template.
    ///
    /// Used for per-file serialize overrides.
    #[must_use]
    pub fn with_serialize(&self, serialize: &str) -> Self {
        let mut spec = self.clone();
        spec.serialize_fmt = serialize.to_string();
        spec
    }

    /// Parse a version string against the configured pattern.
    ///
    /// Components the pattern does not capture default to zero.
    pub fn parse(&self, text: &str) -> VersionResult<Version> {
        let caps = self
            .pattern
            .captures(text)
            .ok_or_else(|| VersionError::Unparseable {
                text: text.to_string(),
                pattern: self.pattern.as_str().to_string(),
            })?;

        let mut values = Vec::with_capacity(self.order.len());
        for part in &self.order {
            let value = match caps.name(part) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| {
                    VersionError::NonNumeric {
                        part: part.clone(),
                        value: m.as_str().to_string(),
                    }
                })?,
                None => 0,
            };
            values.push((part.clone(), value));
        }

        let version = Version::new(values);
        debug!(%text, %version, "parsed version");
        Ok(version)
    }

    /// Render a version back to a string.
    ///
    /// The version's component values are layered on top of `ctx`, so the
    /// serialize template can also reference context keys. Deterministic
    /// for identical inputs.
    pub fn serialize(&self, version: &Version, ctx: &RenderContext) -> String {
        let layer = version
            .components()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        ctx.clone().layered(layer).render(&self.serialize_fmt)
    }
}
