//! Hook registry keyed by section name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::{BoxError, Section};

/// Replaces a section's defaults before the document is read.
///
/// Called with `(section_name, section_defaults)`.
pub type PreHook = Arc<dyn Fn(&str, Section) -> Result<Section, BoxError> + Send + Sync>;

/// Combines defaults with the document, replacing the default merge.
///
/// Called with `(section_name, section_defaults, config_from_file)`.
pub type MergeHook =
    Arc<dyn Fn(&str, Section, Section) -> Result<Section, BoxError> + Send + Sync>;

/// Transforms the merged section before final validation.
///
/// Called with `(section_name, section_config)`.
pub type PostHook = Arc<dyn Fn(&str, Section) -> Result<Section, BoxError> + Send + Sync>;

/// Optional hooks for each section.
///
/// A missing entry means the loader uses its default behavior for that
/// extension point. The registry is read-only once handed to a loader.
#[derive(Clone, Default)]
pub struct HookRegistry {
    prehooks: HashMap<String, PreHook>,
    mergehooks: HashMap<String, MergeHook>,
    posthooks: HashMap<String, PostHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prehook for `section`.
    pub fn with_prehook<F>(mut self, section: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str, Section) -> Result<Section, BoxError> + Send + Sync + 'static,
    {
        self.prehooks.insert(section.into(), Arc::new(hook));
        self
    }

    /// Register a mergehook for `section`.
    pub fn with_mergehook<F>(mut self, section: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str, Section, Section) -> Result<Section, BoxError> + Send + Sync + 'static,
    {
        self.mergehooks.insert(section.into(), Arc::new(hook));
        self
    }

    /// Register a posthook for `section`.
    pub fn with_posthook<F>(mut self, section: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str, Section) -> Result<Section, BoxError> + Send + Sync + 'static,
    {
        self.posthooks.insert(section.into(), Arc::new(hook));
        self
    }

    /// Share one prehook between several sections.
    pub fn with_shared_prehook(mut self, sections: &[&str], hook: PreHook) -> Self {
        for section in sections {
            self.prehooks.insert((*section).to_string(), Arc::clone(&hook));
        }
        self
    }

    /// Share one mergehook between several sections.
    pub fn with_shared_mergehook(mut self, sections: &[&str], hook: MergeHook) -> Self {
        for section in sections {
            self.mergehooks.insert((*section).to_string(), Arc::clone(&hook));
        }
        self
    }

    /// Share one posthook between several sections.
    pub fn with_shared_posthook(mut self, sections: &[&str], hook: PostHook) -> Self {
        for section in sections {
            self.posthooks.insert((*section).to_string(), Arc::clone(&hook));
        }
        self
    }

    pub fn prehook(&self, section: &str) -> Option<&PreHook> {
        self.prehooks.get(section)
    }

    pub fn mergehook(&self, section: &str) -> Option<&MergeHook> {
        self.mergehooks.get(section)
    }

    pub fn posthook(&self, section: &str) -> Option<&PostHook> {
        self.posthooks.get(section)
    }

    pub fn is_empty(&self) -> bool {
        self.prehooks.is_empty() && self.mergehooks.is_empty() && self.posthooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("prehooks", &sorted_keys(&self.prehooks))
            .field("mergehooks", &sorted_keys(&self.mergehooks))
            .field("posthooks", &sorted_keys(&self.posthooks))
            .finish()
    }
}

fn sorted_keys<V>(hooks: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = hooks.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
