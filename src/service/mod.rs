//! Service layer: the loading pipeline, the cache and the configuration façade.

mod cache;
mod config;
mod loader;

pub use cache::{Clock, ConfigCache, ManualClock, SystemClock, DEFAULT_REFRESH_SECONDS};
pub use config::{global, install_global, Config, ConfigBuilder, RefreshPolicy};
pub use loader::{merge_shallow, SectionLoader};
