//! Layered render context for template rendering.
//!
//! Search patterns, replacement text, commit messages and tag names are all
//! templates with `{key}` placeholders. The values come from a
//! [`RenderContext`]: an ordered stack of immutable key/value layers where a
//! later layer overrides an earlier one. Each orchestration phase builds a
//! fresh context instead of mutating a shared one.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::version::Version;

/// An ordered stack of key/value layers, looked up most-recent-first.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    layers: Vec<BTreeMap<String, String>>,
}

impl RenderContext {
    /// Push a layer that overrides all earlier layers.
    pub fn push_layer(&mut self, layer: BTreeMap<String, String>) {
        self.layers.push(layer);
    }

    /// Builder form of [`push_layer`](Self::push_layer).
    #[must_use]
    pub fn layered(mut self, layer: BTreeMap<String, String>) -> Self {
        self.push_layer(layer);
        self
    }

    /// Look up a key, newest layer first.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(key).map(String::as_str))
    }

    /// Render a template, replacing every `{key}` found in the context.
    ///
    /// Unknown placeholders are left in place so a typo is visible in the
    /// output rather than silently erased.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find(['{', '}']) {
                Some(end) if after.as_bytes()[end] == b'}' => {
                    let key = &after[..end];
                    match self.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                // Unterminated or nested brace: emit the brace verbatim and
                // resume scanning right after it.
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Build the render context for one orchestration phase.
///
/// Layers, earliest first: static configuration values, then the current
/// version's components, then the next version's components. Identical
/// component names resolve to the next version's values; the serialized
/// `current_version` / `new_version` strings are layered explicitly by the
/// callers that need to distinguish the two sides.
pub fn render_context(
    config: &Config,
    current: Option<&Version>,
    new: Option<&Version>,
) -> RenderContext {
    let mut ctx = RenderContext::default();

    let mut base = BTreeMap::new();
    if let Some(ref version) = config.current_version {
        base.insert("current_version".to_string(), version.clone());
    }
    if let Some(tool) = config.scm_info.tool {
        base.insert("scm_tool".to_string(), tool.to_string());
    }
    ctx.push_layer(base);

    if let Some(version) = current {
        ctx.push_layer(component_layer(version));
    }
    if let Some(version) = new {
        ctx.push_layer(component_layer(version));
    }

    ctx
}

fn component_layer(version: &Version) -> BTreeMap<String, String> {
    version
        .components()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
