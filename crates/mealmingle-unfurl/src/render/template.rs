//! The share page template, loaded once at startup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

use super::{Flags, Placeholder, PlaceholderMap, Slot};

static ANY_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"));

/// An immutable HTML template with `{{placeholder}}` tokens.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Read the template from disk.
    ///
    /// Failure here is fatal for the process: no page can be served without it.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?;

        let template = Self::from_source(source);
        template.check_tokens();

        tracing::info!(
            path = %path.display(),
            bytes = template.source.len(),
            "template loaded"
        );

        Ok(template)
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render this template. See [`super::render`].
    pub fn render(&self, values: &PlaceholderMap, flags: &Flags) -> String {
        super::render(&self.source, values, flags)
    }

    /// How many times each placeholder token appears in the source.
    pub fn placeholder_counts(&self) -> BTreeMap<Placeholder, usize> {
        let mut counts = BTreeMap::new();
        for caps in ANY_TOKEN_RE.captures_iter(&self.source) {
            if let Some(placeholder) = Placeholder::from_name(&caps[1]) {
                *counts.entry(placeholder).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Tokens that are neither vocabulary placeholders nor block markers.
    pub fn unknown_tokens(&self) -> Vec<String> {
        ANY_TOKEN_RE
            .captures_iter(&self.source)
            .map(|caps| caps[1].to_string())
            .filter(|name| !is_block_marker(name) && Placeholder::from_name(name).is_none())
            .collect()
    }

    /// Log template mistakes that would show up as literal tokens in pages.
    fn check_tokens(&self) {
        for name in self.unknown_tokens() {
            tracing::warn!(token = %name, "template contains an unknown placeholder");
        }

        let counts = self.placeholder_counts();
        for placeholder in Placeholder::ALL {
            match counts.get(&placeholder).copied().unwrap_or(0) {
                0 => tracing::debug!(
                    placeholder = placeholder.name(),
                    "placeholder not used by template"
                ),
                n if n > 1 && placeholder.slot() == Slot::Single => tracing::warn!(
                    placeholder = placeholder.name(),
                    occurrences = n,
                    "single-slot placeholder appears more than once; only the first is filled"
                ),
                _ => {}
            }
        }
    }
}

fn is_block_marker(name: &str) -> bool {
    name.starts_with(['#', '^', '/'])
}
