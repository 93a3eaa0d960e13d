//! Named text-normalization functions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A pure string-to-string normalization function.
pub type Cleaner = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Explicit name → cleaner map.
///
/// Cleaner names coming from configuration are resolved against this map
/// when a tokenizer is constructed, so a misspelled name fails before any
/// synthesis runs. Language-specific rule sets (number or abbreviation
/// expansion) are not part of this crate; callers supply them through
/// [`CleanerRegistry::register`].
pub struct CleanerRegistry {
    cleaners: HashMap<String, Cleaner>,
}

impl CleanerRegistry {
    /// Registry pre-populated with the built-ins `lowercase`,
    /// `collapse_whitespace`, and `basic_cleaners`.
    pub fn new() -> Self {
        let mut registry = Self {
            cleaners: HashMap::new(),
        };
        registry.register("lowercase", |text: &str| text.to_lowercase());
        registry.register("collapse_whitespace", collapse_whitespace);
        registry.register("basic_cleaners", |text: &str| {
            collapse_whitespace(&text.to_lowercase())
        });
        registry
    }

    /// Insert or replace the cleaner registered under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        cleaner: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        self.cleaners.insert(name.into(), Arc::new(cleaner));
    }

    /// Look up a single cleaner by name.
    pub fn get(&self, name: &str) -> Option<&Cleaner> {
        self.cleaners.get(name)
    }

    /// Resolve `names` in application order, failing on the first unknown
    /// name.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Cleaner>> {
        names
            .iter()
            .map(|name| {
                self.cleaners
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::Config(format!("unknown cleaner '{name}'")))
            })
            .collect()
    }
}

impl Default for CleanerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CleanerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.cleaners.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CleanerRegistry")
            .field("cleaners", &names)
            .finish()
    }
}

/// Squeeze every whitespace run down to a single space. Does not trim.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
