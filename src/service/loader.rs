//! Section loading pipeline.
//!
//! Each load runs, in order: partial validation of the defaults, the
//! prehook, the document read, the merge (mergehook or shallow overwrite),
//! partial validation of the merge, the posthook, and a final full
//! validation. The first failing step aborts the load.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{
    ConfigError, Defaults, HookStage, Mode, Result, Schema, Section, SectionSchema, Validator,
};
use crate::hooks::HookRegistry;
use crate::source::DocumentSource;

/// Turns defaults plus a section document into a validated section.
pub struct SectionLoader {
    schema: Arc<Schema>,
    defaults: Arc<Defaults>,
    hooks: Arc<HookRegistry>,
    source: Arc<dyn DocumentSource>,
    validator: Validator,
}

impl SectionLoader {
    pub fn new(
        schema: Arc<Schema>,
        defaults: Arc<Defaults>,
        hooks: Arc<HookRegistry>,
        source: Arc<dyn DocumentSource>,
    ) -> Self {
        Self {
            schema,
            defaults,
            hooks,
            source,
            validator: Validator::new(),
        }
    }

    /// Same schema, defaults and hooks, reading documents from `source`.
    pub fn with_source(&self, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            defaults: Arc::clone(&self.defaults),
            hooks: Arc::clone(&self.hooks),
            source,
            validator: self.validator,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Load `section_name` using its declared schema and defaults.
    pub fn load(&self, section_name: &str) -> Result<Section> {
        let section_schema = self
            .schema
            .get(section_name)
            .ok_or_else(|| ConfigError::SchemaNotFound(section_name.to_string()))?;
        self.load_section(section_name, self.defaults.section(section_name), section_schema)
    }

    /// Run the pipeline for one section.
    #[instrument(skip(self, section_defaults, section_schema))]
    pub fn load_section(
        &self,
        section_name: &str,
        section_defaults: Section,
        section_schema: &SectionSchema,
    ) -> Result<Section> {
        self.check(section_name, &section_defaults, section_schema, Mode::Partial)?;

        let section_defaults = match self.hooks.prehook(section_name) {
            Some(prehook) => {
                debug!("Running prehook");
                let prepared = prehook(section_name, section_defaults)
                    .map_err(|e| hook_error(section_name, HookStage::Pre, e))?;
                self.check(section_name, &prepared, section_schema, Mode::Partial)?;
                prepared
            }
            None => section_defaults,
        };

        let config_from_file = self.source.read_section(section_name)?;
        debug!(
            "Read {} keys from {}",
            config_from_file.len(),
            self.source.name()
        );

        let section_config = match self.hooks.mergehook(section_name) {
            Some(mergehook) => {
                debug!("Running mergehook");
                mergehook(section_name, section_defaults, config_from_file)
                    .map_err(|e| hook_error(section_name, HookStage::Merge, e))?
            }
            None => merge_shallow(section_defaults, config_from_file),
        };
        self.check(section_name, &section_config, section_schema, Mode::Partial)?;

        let section_config = match self.hooks.posthook(section_name) {
            Some(posthook) => {
                debug!("Running posthook");
                posthook(section_name, section_config)
                    .map_err(|e| hook_error(section_name, HookStage::Post, e))?
            }
            None => section_config,
        };

        self.check(section_name, &section_config, section_schema, Mode::Full)?;
        Ok(section_config)
    }

    fn check(
        &self,
        section_name: &str,
        section: &Section,
        section_schema: &SectionSchema,
        mode: Mode,
    ) -> Result<()> {
        self.validator
            .validate(section, section_schema, mode)
            .map_err(|errors| ConfigError::Validation {
                section: section_name.to_string(),
                errors,
            })
    }
}

/// Default merge: document keys overwrite defaults at the top level only.
///
/// Nested mappings are replaced wholesale, never merged.
pub fn merge_shallow(mut section_defaults: Section, config_from_file: Section) -> Section {
    section_defaults.extend(config_from_file);
    section_defaults
}

fn hook_error(section_name: &str, stage: HookStage, error: crate::domain::BoxError) -> ConfigError {
    ConfigError::Hook {
        section: section_name.to_string(),
        stage,
        message: error.to_string(),
    }
}
