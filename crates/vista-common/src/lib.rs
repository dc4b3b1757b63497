pub mod errors;
pub mod id;

pub use errors::{ConfigError, StoreError, VistaError, WebviewError};
pub use id::PanelId;
