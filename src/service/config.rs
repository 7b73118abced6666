//! Section-keyed configuration façade.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use super::cache::{Clock, ConfigCache, SystemClock, DEFAULT_REFRESH_SECONDS};
use super::loader::SectionLoader;
use crate::domain::{ConfigError, Defaults, Mode, Result, Schema, Section, SectionSchema};
use crate::hooks::HookRegistry;
use crate::source::{document, DocumentSource, SingleFileSource};

/// How stale sections are reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Each section is reloaded on its own when it goes stale.
    PerSection,
    /// The whole document is re-read and every section reloaded together.
    WholeDocument,
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    schema: Schema,
    defaults: Defaults,
    hooks: HookRegistry,
    source: Arc<dyn DocumentSource>,
    policy: RefreshPolicy,
    refresh_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl ConfigBuilder {
    /// Per-section configuration read from `source`.
    pub fn new<S: DocumentSource + 'static>(schema: Schema, source: S) -> Self {
        Self::from_shared(schema, Arc::new(source), RefreshPolicy::PerSection)
    }

    /// Whole-document configuration read from a single file.
    pub fn single_file(schema: Schema, source: SingleFileSource) -> Self {
        Self::from_shared(schema, Arc::new(source), RefreshPolicy::WholeDocument)
    }

    pub fn from_shared(
        schema: Schema,
        source: Arc<dyn DocumentSource>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            schema,
            defaults: Defaults::new(),
            hooks: HookRegistry::new(),
            source,
            policy,
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Age in seconds after which a section is reloaded on access.
    pub fn refresh_seconds(mut self, seconds: u64) -> Self {
        self.refresh_seconds = seconds;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the configuration.
    ///
    /// Whole-document configurations are loaded immediately; per-section
    /// ones load each section on first access.
    pub fn build(self) -> Result<Config> {
        let loader = SectionLoader::new(
            Arc::new(self.schema),
            Arc::new(self.defaults),
            Arc::new(self.hooks),
            self.source,
        );
        let config = Config {
            loader,
            cache: ConfigCache::new(self.refresh_seconds, self.clock),
            policy: self.policy,
        };

        if config.policy == RefreshPolicy::WholeDocument {
            config.refresh_all()?;
        }
        Ok(config)
    }
}

/// Validated configuration, looked up by section name.
///
/// Reads are lazy: a stale section is reloaded synchronously by the call
/// that finds it stale. Concurrent readers may reload the same section
/// twice; the last store wins.
pub struct Config {
    loader: SectionLoader,
    cache: ConfigCache,
    policy: RefreshPolicy,
}

impl Config {
    pub fn builder<S: DocumentSource + 'static>(schema: Schema, source: S) -> ConfigBuilder {
        ConfigBuilder::new(schema, source)
    }

    /// Return a section, reloading it first if it is stale.
    pub fn get(&self, section_name: &str) -> Result<Arc<Section>> {
        self.require_schema(section_name)?;

        if self.cache.is_stale(section_name) {
            debug!("Section '{}' is stale", section_name);
            self.reload(section_name)?;
        }

        self.cache
            .get(section_name)
            .ok_or_else(|| ConfigError::SectionNotFound(section_name.to_string()))
    }

    /// Reload a section now, regardless of its age, and return it.
    pub fn load(&self, section_name: &str) -> Result<Arc<Section>> {
        self.require_schema(section_name)?;
        self.reload(section_name)?;
        self.cache
            .get(section_name)
            .ok_or_else(|| ConfigError::SectionNotFound(section_name.to_string()))
    }

    /// Reload every section.
    ///
    /// On success the cache holds exactly the sections loaded by this pass.
    /// On failure the sections loaded before the failing one are kept and
    /// the error is returned.
    ///
    /// A whole-document pass reads every section from the one snapshot
    /// taken at its start.
    pub fn refresh_all(&self) -> Result<()> {
        let (pass, names) = match self.policy {
            RefreshPolicy::PerSection => {
                let names = self
                    .loader
                    .schema()
                    .section_names()
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                (None, names)
            }
            RefreshPolicy::WholeDocument => {
                let snapshot = self.loader.source().reload()?;
                let mut names: BTreeSet<String> =
                    self.loader.defaults().section_names().map(str::to_string).collect();
                let pass = snapshot.map(|snapshot| {
                    names.extend(snapshot.section_names().map(str::to_string));
                    self.loader.with_source(Arc::new(snapshot))
                });
                (pass, names.into_iter().collect())
            }
        };
        let loader = pass.as_ref().unwrap_or(&self.loader);

        info!("Refreshing {} sections", names.len());
        let mut loaded = Vec::with_capacity(names.len());
        for name in names {
            match loader.load(&name) {
                Ok(section) => loaded.push((name, section)),
                Err(e) => {
                    warn!("Refresh stopped at section '{}': {}", name, e);
                    self.cache.commit(loaded, false);
                    return Err(e);
                }
            }
        }

        self.cache.commit(loaded, true);
        Ok(())
    }

    /// Validate a raw document for one section and write it to the source.
    ///
    /// Returns the bytes actually stored (ciphertext for encrypted sources).
    pub fn save(&self, section_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
        let section_schema = self.require_schema(section_name)?;
        let parsed = document::parse_section_strict(section_name, contents)?;

        self.loader
            .validator()
            .validate(&parsed, section_schema, Mode::Full)
            .map_err(|errors| ConfigError::Validation {
                section: section_name.to_string(),
                errors,
            })?;

        let stored = self.loader.source().write_section(section_name, contents)?;
        self.cache.invalidate(section_name);
        info!(
            "Saved section '{}' to {}",
            section_name,
            self.loader.source().name()
        );
        Ok(stored)
    }

    pub fn schema(&self) -> &Schema {
        self.loader.schema()
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn refresh_seconds(&self) -> u64 {
        self.cache.refresh_seconds()
    }

    /// Unix time of the section's last load, if it has been loaded.
    pub fn last_refresh(&self, section_name: &str) -> Option<u64> {
        self.cache.last_refresh(section_name)
    }

    /// Sections currently held in the cache.
    pub fn loaded_sections(&self) -> Vec<String> {
        self.cache.section_names()
    }

    fn require_schema(&self, section_name: &str) -> Result<&SectionSchema> {
        self.loader
            .schema()
            .get(section_name)
            .ok_or_else(|| ConfigError::SchemaNotFound(section_name.to_string()))
    }

    fn reload(&self, section_name: &str) -> Result<()> {
        // In whole-document mode a section outside the last pass (schema
        // only, or after a failed pass) is loaded on its own, leaving the
        // rest of the cache untouched.
        let whole_pass = self.policy == RefreshPolicy::WholeDocument
            && self.cache.last_refresh(section_name).is_some();
        if whole_pass {
            self.refresh_all()?;
            if self.cache.last_refresh(section_name).is_some() {
                return Ok(());
            }
        }

        let section = self.loader.load(section_name)?;
        self.cache.store(section_name, section);
        Ok(())
    }
}

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// Install the process-wide configuration. Can only be done once.
pub fn install_global(config: Config) -> Result<&'static Config> {
    GLOBAL
        .set(config)
        .map_err(|_| ConfigError::AlreadyInstalled)?;
    GLOBAL.get().ok_or(ConfigError::AlreadyInstalled)
}

/// The process-wide configuration, if installed.
pub fn global() -> Option<&'static Config> {
    GLOBAL.get()
}
