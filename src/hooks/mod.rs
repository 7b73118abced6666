//! Per-section extension points for the loading pipeline.

mod registry;

pub use registry::{HookRegistry, MergeHook, PostHook, PreHook};
