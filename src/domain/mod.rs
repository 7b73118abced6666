//! Domain layer containing the core configuration types.
//!
//! This module contains:
//! - Section, defaults and field-error types
//! - Declarative schemas and the validator
//! - The error taxonomy
//! - Logger with rotation

mod error;
pub mod logger;
pub mod schema;
mod types;
pub mod validator;

pub use error::{BoxError, ConfigError, HookStage, Result};
pub use schema::{FieldRule, FieldType, Pattern, Schema, SectionSchema};
pub use types::{Defaults, FieldErrors, Section, Value};
pub use validator::{Mode, Validator};
