//! Configuration schema types for Vista.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod links;
mod persistence;
mod storage;
mod system;

pub use links::*;
pub use persistence::*;
pub use storage::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VistaConfig {
    pub persistence: PersistenceConfig,
    pub storage: StorageConfig,
    pub links: LinksConfig,
    pub resources: ResourcesConfig,
    pub logging: LoggingConfig,
}
