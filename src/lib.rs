//! sectioncfg: section-keyed YAML configuration.
//!
//! Settings are declared per section as in-code defaults plus a schema.
//! Each section is loaded through a pipeline of optional hooks, merged with
//! an on-disk or remote YAML document, validated, and cached until it is
//! older than the refresh interval.
//!
//! ```no_run
//! use sectioncfg::{ConfigBuilder, DirectorySource, Schema};
//!
//! let schema = Schema::from_yaml_str("app:\n  debug:\n    type: boolean\n")?;
//! let config = ConfigBuilder::new(schema, DirectorySource::new("/etc/myapp")).build()?;
//! let app = config.get("app")?;
//! println!("debug = {:?}", app.get("debug"));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod domain;
pub mod hooks;
pub mod service;
pub mod source;
pub mod testing;

pub use domain::{
    ConfigError, Defaults, FieldErrors, FieldRule, FieldType, HookStage, Mode, Result, Schema,
    Section, SectionSchema, Validator, Value,
};
pub use hooks::HookRegistry;
pub use service::{Config, ConfigBuilder, ManualClock, RefreshPolicy};
pub use source::{
    BlobStore, BucketPath, Cipher, DirectorySource, DocumentSnapshot, DocumentSource,
    MemoryBlobStore, RemoteSource, SingleFileSource,
};
